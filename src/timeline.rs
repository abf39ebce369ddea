// src/timeline.rs

/// Result of advancing the series clock by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineStep {
    /// Whole series steps that elapsed during the frame.
    pub steps: u64,
    /// Fractional step carried into the next frame, in `[0, 1)`.
    pub accumulator: f64,
}

/// Converts frame time into whole series steps at `samples_per_second`.
///
/// The fractional remainder is returned rather than kept, so the caller threads it
/// into the next call. Non-positive or non-finite timing input yields zero steps and
/// hands the accumulator back untouched, as does a frame whose step count does not
/// fit in a `u64`.
pub fn step_timeline(elapsed_ms: f64, samples_per_second: f64, accumulator: f64) -> TimelineStep {
    let valid = |value: f64| value.is_finite() && value > 0.0;
    if !valid(elapsed_ms) || !valid(samples_per_second) {
        return TimelineStep {
            steps: 0,
            accumulator,
        };
    }

    let carried = if accumulator.is_finite() && (0.0..1.0).contains(&accumulator) {
        accumulator
    } else {
        0.0
    };

    let fractional = carried + elapsed_ms * samples_per_second / 1000.0;
    if !fractional.is_finite() || fractional >= u64::MAX as f64 {
        return TimelineStep {
            steps: 0,
            accumulator,
        };
    }

    let whole = fractional.floor();
    TimelineStep {
        steps: whole as u64,
        accumulator: fractional - whole,
    }
}
