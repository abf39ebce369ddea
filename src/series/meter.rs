use crate::config::CaptureConfig;
use crate::utils::buffer_ops::{amplitude_to_db, peak, rms};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelReading {
    pub rms: f32,
    pub peak: f32,
    /// RMS level in dBFS, never below the meter's floor.
    pub dbfs: f64,
}

/// Reduces a batch of samples to one level reading.
#[derive(Debug, Clone, Copy)]
pub struct LevelMeter {
    floor_db: f64,
}

impl LevelMeter {
    pub fn new(floor_db: f64) -> Self {
        Self { floor_db }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.floor_db)
    }

    pub fn measure(&self, samples: &[f32]) -> LevelReading {
        let rms = rms(samples);
        LevelReading {
            rms,
            peak: peak(samples),
            dbfs: amplitude_to_db(rms, self.floor_db),
        }
    }
}
