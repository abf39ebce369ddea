use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::logging::log_console;
use crate::series::meter::{LevelMeter, LevelReading};
use crate::series::Series;
use crate::timeline::step_timeline;
use crate::utils::interpolate;

/// Frame-loop side of the pipeline.
///
/// Batches arriving from the capture node are metered with [`ingest`](Self::ingest);
/// each animation frame calls [`tick`](Self::tick), which advances the series clock
/// and fills the elapsed slots from the last charted value towards the latest level.
/// The fractional step accumulator lives here, between ticks, and nowhere else.
pub struct LevelRecorder {
    meter: LevelMeter,
    series: Series,
    series_rate: f64,
    accumulator: f64,
    latest: f64,
    since_last_batch_ms: f64,
    stale_after_ms: f64,
    window_length: usize,
}

impl LevelRecorder {
    pub fn new(config: &CaptureConfig) -> Result<Self, CaptureError> {
        config.validate()?;
        Ok(Self {
            meter: LevelMeter::from_config(config),
            series: Series::with_capacity(config.window_length),
            series_rate: config.series_rate,
            accumulator: 0.0,
            latest: f64::NAN,
            since_last_batch_ms: 0.0,
            stale_after_ms: config.stale_after_ms,
            window_length: config.window_length,
        })
    }

    /// Meters one batch and makes its level the target for the next ticks.
    pub fn ingest(&mut self, samples: &[f32]) -> LevelReading {
        let reading = self.meter.measure(samples);
        if self.latest.is_nan() {
            log_console(&format!("level signal acquired at {:.1} dBFS", reading.dbfs));
        }
        self.latest = reading.dbfs;
        self.since_last_batch_ms = 0.0;
        reading
    }

    /// Advances by one frame and returns how many values were appended.
    ///
    /// A single frame appends at most `window_length` values, however long the gap.
    pub fn tick(&mut self, elapsed_ms: f64) -> usize {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.since_last_batch_ms += elapsed_ms;
        }
        if !self.latest.is_nan() && self.since_last_batch_ms > self.stale_after_ms {
            log_console(&format!(
                "no level batch for {:.0} ms, marking signal unavailable",
                self.since_last_batch_ms
            ));
            self.latest = f64::NAN;
        }

        let step = step_timeline(elapsed_ms, self.series_rate, self.accumulator);
        self.accumulator = step.accumulator;

        let previous = self.series.last().unwrap_or(f64::NAN);
        let capped = step.steps.min(self.window_length as u64);
        if capped < step.steps {
            log_console(&format!(
                "frame covered {} series steps, appending the last {}",
                step.steps, capped
            ));
        }
        let steps = i64::try_from(capped).unwrap_or(i64::MAX);
        let span = interpolate(previous, self.latest, steps);
        let appended = span.len();
        self.series.extend(span);
        appended
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    /// The visible part of the series, always `window_length` wide.
    pub fn window(&self) -> Vec<f64> {
        self.series.window(self.window_length)
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Latest level in dBFS, `NaN` while no signal is available.
    pub fn latest(&self) -> f64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn recorder() -> LevelRecorder {
        LevelRecorder::new(&CaptureConfig {
            window_length: 16,
            ..CaptureConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn ticks_append_stepped_counts() {
        let mut recorder = recorder();
        let mut appended = 0;
        for _ in 0..300 {
            appended += recorder.tick(FRAME_MS);
        }
        assert_eq!(appended, 1500);
        assert_eq!(recorder.series().len(), 1500);
    }

    #[test]
    fn series_is_nan_until_first_batch() {
        let mut recorder = recorder();
        recorder.tick(FRAME_MS);
        assert!(recorder.series().as_slice().iter().all(|v| v.is_nan()));

        recorder.ingest(&[0.5; 2048]);
        recorder.tick(FRAME_MS);
        let level = recorder.latest();
        assert!((level + 6.0206).abs() < 1e-3);
        // Coming out of NaN the span holds the new level rather than ramping.
        let values = recorder.series().as_slice();
        assert!(values[5..].iter().all(|&v| v == level));
    }

    #[test]
    fn ramps_between_levels() {
        let mut recorder = recorder();
        recorder.ingest(&[1.0; 64]);
        recorder.tick(FRAME_MS);
        assert_eq!(recorder.series().last(), Some(0.0));

        recorder.ingest(&[0.1; 64]);
        let before = recorder.series().len();
        recorder.tick(FRAME_MS);
        let span = &recorder.series().as_slice()[before..];
        assert_eq!(span.len(), 5);
        assert!(span.windows(2).all(|pair| pair[1] < pair[0]));
        assert_eq!(*span.last().unwrap(), recorder.latest());
    }

    #[test]
    fn stale_input_switches_to_nan() {
        let mut recorder = LevelRecorder::new(&CaptureConfig {
            stale_after_ms: 110.0,
            ..CaptureConfig::default()
        })
        .unwrap();
        recorder.ingest(&[0.25; 128]);
        for _ in 0..6 {
            recorder.tick(FRAME_MS);
        }
        assert!(!recorder.latest().is_nan());

        recorder.tick(FRAME_MS);
        assert!(recorder.latest().is_nan());
        assert!(recorder.series().last().unwrap().is_nan());
    }

    #[test]
    fn invalid_elapsed_appends_nothing() {
        let mut recorder = recorder();
        recorder.tick(7.0);
        let accumulator = recorder.accumulator();
        assert_eq!(recorder.tick(0.0), 0);
        assert_eq!(recorder.tick(-16.0), 0);
        assert_eq!(recorder.accumulator(), accumulator);
    }

    #[test]
    fn long_gap_appends_at_most_one_window() {
        let mut recorder = LevelRecorder::new(&CaptureConfig {
            window_length: 16,
            stale_after_ms: 1e9,
            ..CaptureConfig::default()
        })
        .unwrap();
        recorder.ingest(&[0.5; 256]);

        // An hour at 300 sps is over a million steps.
        let appended = recorder.tick(3_600_000.0);
        assert_eq!(appended, 16);
        assert_eq!(recorder.series().len(), 16);
        assert_eq!(recorder.series().last(), Some(recorder.latest()));
        assert!((0.0..1.0).contains(&recorder.accumulator()));
    }

    #[test]
    fn huge_elapsed_does_not_panic() {
        let mut recorder = LevelRecorder::new(&CaptureConfig::default()).unwrap();
        recorder.tick(FRAME_MS);
        let before = recorder.series().len();

        assert_eq!(recorder.tick(1e300), 0);
        assert!(recorder.tick(1e15) <= 1500);
        assert!(recorder.series().len() <= before + 1500);
        assert!((0.0..1.0).contains(&recorder.accumulator()));
        assert_eq!(recorder.window().len(), 1500);
    }

    #[test]
    fn window_width_is_constant() {
        let mut recorder = recorder();
        assert_eq!(recorder.window().len(), 16);
        for _ in 0..10 {
            recorder.tick(FRAME_MS);
            assert_eq!(recorder.window().len(), 16);
        }
    }
}
