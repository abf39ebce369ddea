use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

pub const DEFAULT_BATCH_CAPACITY: usize = 2048;
pub const DEFAULT_QUEUE_DEPTH: usize = 32;
pub const DEFAULT_SERIES_RATE: f64 = 300.0;
pub const DEFAULT_FLOOR_DB: f64 = -100.0;
pub const DEFAULT_STALE_AFTER_MS: f64 = 1000.0;
/// Five seconds of history at the default series rate.
pub const DEFAULT_WINDOW_LENGTH: usize = 1500;

/// Options shared by the capture node and the frame loop.
///
/// Field names follow the JavaScript side (`processorOptions` on the worklet node),
/// and every field falls back to its default when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    pub batch_capacity: usize,
    pub queue_depth: usize,
    pub series_rate: f64,
    pub floor_db: f64,
    pub stale_after_ms: f64,
    pub window_length: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            series_rate: DEFAULT_SERIES_RATE,
            floor_db: DEFAULT_FLOOR_DB,
            stale_after_ms: DEFAULT_STALE_AFTER_MS,
            window_length: DEFAULT_WINDOW_LENGTH,
        }
    }
}

impl CaptureConfig {
    pub fn from_json(text: &str) -> Result<Self, CaptureError> {
        let config: CaptureConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.batch_capacity == 0 {
            return Err(CaptureError::ZeroCapacity);
        }
        if self.queue_depth == 0 {
            return Err(CaptureError::ZeroQueueDepth);
        }
        if self.window_length == 0 {
            return Err(CaptureError::ZeroWindow);
        }
        if !(self.series_rate.is_finite() && self.series_rate > 0.0) {
            return Err(CaptureError::InvalidSeriesRate(self.series_rate));
        }
        if !(self.stale_after_ms.is_finite() && self.stale_after_ms > 0.0) {
            return Err(CaptureError::InvalidStaleTimeout(self.stale_after_ms));
        }
        if !(self.floor_db.is_finite() && self.floor_db <= 0.0) {
            return Err(CaptureError::InvalidFloor(self.floor_db));
        }
        Ok(())
    }
}
