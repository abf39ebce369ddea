pub mod buffer_ops;
pub mod gap_fill;

pub use gap_fill::interpolate;
