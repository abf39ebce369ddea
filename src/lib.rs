pub mod audio;
pub mod capture;
pub mod config;
pub mod error;
mod logging;
pub mod registry;
pub mod series;
pub mod timeline;
pub mod traits;
pub mod utils;
pub mod worklet;

pub use audio::{Batch, SampleBuffer};
pub use capture::{batch_channel, BatchReceiver, BatchSender, BatchSink, CaptureBatcher, CaptureStats};
pub use config::CaptureConfig;
pub use error::CaptureError;
pub use registry::{ProcessorRegistry, CAPTURE_PROCESSOR_ID};
pub use series::{LevelMeter, LevelReading, LevelRecorder, Series};
pub use timeline::{step_timeline, TimelineStep};
pub use traits::CaptureNode;
pub use utils::interpolate;

#[cfg(feature = "wasm")]
pub use worklet::{LevelCaptureProcessor, PortBatchSink};
