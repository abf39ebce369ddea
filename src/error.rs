use thiserror::Error;

/// Construction-time failures. Nothing on the capture or frame path returns these.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("batch capacity must be greater than zero")]
    ZeroCapacity,

    #[error("queue depth must be greater than zero")]
    ZeroQueueDepth,

    #[error("series window length must be greater than zero")]
    ZeroWindow,

    #[error("series rate must be a positive finite number, got {0}")]
    InvalidSeriesRate(f64),

    #[error("stale timeout must be a positive finite number of milliseconds, got {0}")]
    InvalidStaleTimeout(f64),

    #[error("level floor must be a finite value at or below 0 dBFS, got {0}")]
    InvalidFloor(f64),

    #[error("no processor registered under \"{0}\"")]
    UnknownProcessor(String),

    #[error("invalid capture options: {0}")]
    Options(#[from] serde_json::Error),
}

#[cfg(feature = "wasm")]
impl From<CaptureError> for wasm_bindgen::JsValue {
    fn from(err: CaptureError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
