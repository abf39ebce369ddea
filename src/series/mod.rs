pub mod meter;
pub mod recorder;
pub mod series;

pub use meter::{LevelMeter, LevelReading};
pub use recorder::LevelRecorder;
pub use series::Series;
