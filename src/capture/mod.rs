pub mod batcher;
pub mod channel;

pub use batcher::{CaptureBatcher, CaptureStats};
pub use channel::{batch_channel, BatchReceiver, BatchSender, BatchSink};
