use crate::capture::{BatchSink, CaptureBatcher, CaptureStats};

/// A processing node a host pipeline drives once per audio callback.
///
/// The host owns the output buffers and zero-fills them itself; nodes only see input.
pub trait CaptureNode: Send {
    fn process(&mut self, input: Option<&[f32]>);

    fn capacity(&self) -> usize;

    /// Samples held back until the current batch fills up.
    fn pending_len(&self) -> usize;

    fn stats(&self) -> CaptureStats;

    fn reset(&mut self);
}

impl<S> CaptureNode for CaptureBatcher<S>
where
    S: BatchSink + Send,
{
    fn process(&mut self, input: Option<&[f32]>) {
        CaptureBatcher::process(self, input);
    }

    fn capacity(&self) -> usize {
        CaptureBatcher::capacity(self)
    }

    fn pending_len(&self) -> usize {
        self.pending().len()
    }

    fn stats(&self) -> CaptureStats {
        CaptureBatcher::stats(self)
    }

    fn reset(&mut self) {
        CaptureBatcher::reset(self);
    }
}
