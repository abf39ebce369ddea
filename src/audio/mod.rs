pub mod buffer;

pub use buffer::{Batch, SampleBuffer};
