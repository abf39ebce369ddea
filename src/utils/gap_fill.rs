// src/utils/gap_fill.rs

/// Values for `steps` series slots between a known `previous` and the new `next`.
///
/// The span excludes `previous` and ends on `next`. When either endpoint is not
/// finite the span simply repeats `next`, which keeps a `NaN` "no signal" marker
/// intact instead of smearing it into neighbouring values. A span too large to
/// address or allocate on this target comes back empty.
pub fn interpolate(previous: f64, next: f64, steps: i64) -> Vec<f64> {
    if steps <= 0 {
        return Vec::new();
    }
    let Ok(count) = usize::try_from(steps) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    if values.try_reserve_exact(count).is_err() {
        return Vec::new();
    }

    if !previous.is_finite() || !next.is_finite() {
        values.resize(count, next);
        return values;
    }

    let delta = next - previous;
    values.extend((1..steps).map(|i| previous + delta * i as f64 / steps as f64));
    // Pin the endpoint so rounding never leaves the span short of `next`.
    values.push(next);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn non_positive_steps_yield_nothing() {
        assert!(interpolate(1.0, 2.0, 0).is_empty());
        assert!(interpolate(1.0, 2.0, -3).is_empty());
    }

    #[test]
    fn single_step_is_next() {
        assert_eq!(interpolate(1.0, 2.0, 1), vec![2.0]);
        assert!(interpolate(1.0, f64::NAN, 1)[0].is_nan());
    }

    #[test]
    fn linear_span_excludes_previous_and_ends_on_next() {
        assert_eq!(interpolate(0.0, 10.0, 5), vec![2.0, 4.0, 6.0, 8.0, 10.0]);

        let falling = interpolate(-20.0, -60.0, 4);
        let expected = [-30.0, -40.0, -50.0, -60.0];
        for (value, want) in falling.iter().zip(expected) {
            assert!((value - want).abs() < EPSILON);
        }
    }

    #[test]
    fn non_finite_endpoints_hold_next() {
        assert_eq!(interpolate(f64::NAN, 7.0, 3), vec![7.0, 7.0, 7.0]);
        assert_eq!(interpolate(f64::NEG_INFINITY, -12.5, 2), vec![-12.5, -12.5]);

        let dropout = interpolate(5.0, f64::NAN, 3);
        assert_eq!(dropout.len(), 3);
        assert!(dropout.iter().all(|value| !value.is_finite()));
    }

    #[test]
    fn length_matches_step_count() {
        for steps in -2..40 {
            assert_eq!(interpolate(0.3, 0.9, steps).len(), steps.max(0) as usize);
        }
    }

    #[test]
    fn unallocatable_span_is_empty_instead_of_panicking() {
        assert!(interpolate(0.0, 1.0, i64::MAX).is_empty());
        assert!(interpolate(f64::NAN, 1.0, i64::MAX).is_empty());
    }

    #[test]
    fn last_value_is_exactly_next() {
        let pairs = [(0.1, 0.3), (-97.3, -3.7), (1e-9, 1e9), (0.7, 0.7)];
        for (a, b) in pairs {
            for n in 2..64 {
                assert_eq!(*interpolate(a, b, n).last().unwrap(), b);
            }
        }
    }
}
