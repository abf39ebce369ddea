use crate::audio::buffer::alloc_storage;
use crate::audio::{Batch, SampleBuffer};
use crate::capture::channel::BatchSink;
use crate::config::CaptureConfig;
use crate::error::CaptureError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Batches accepted by the sink.
    pub emitted: u64,
    /// Batches the sink could not take; their samples were discarded.
    pub dropped: u64,
}

/// Turns variable-length callback chunks into fixed-size batches.
///
/// Runs on the audio thread: `process` copies, flushes and never waits. The only
/// allocation is a fresh buffer at flush time, and only when neither the sink nor
/// a previously rejected batch has storage to give back.
pub struct CaptureBatcher<S: BatchSink> {
    buffer: SampleBuffer,
    sink: S,
    spare: Option<Box<[f32]>>,
    stats: CaptureStats,
}

impl<S: BatchSink> CaptureBatcher<S> {
    pub fn new(capacity: usize, sink: S) -> Self {
        Self {
            buffer: SampleBuffer::new(capacity.max(1)),
            sink,
            spare: None,
            stats: CaptureStats::default(),
        }
    }

    pub fn from_config(config: &CaptureConfig, sink: S) -> Result<Self, CaptureError> {
        config.validate()?;
        Ok(Self::new(config.batch_capacity, sink))
    }

    /// Consumes one callback's worth of input. `None` and empty slices are silence
    /// continuation and do nothing.
    pub fn process(&mut self, input: Option<&[f32]>) {
        let Some(mut remaining) = input else {
            return;
        };

        while !remaining.is_empty() {
            let written = self.buffer.write(remaining);
            remaining = &remaining[written..];
            if self.buffer.is_full() {
                self.flush();
            }
        }
    }

    /// Emits the buffer if it is exactly full. Returns whether the sink took a batch.
    ///
    /// A partial buffer is never emitted; the offset is reset whenever a full
    /// buffer is handed off or dropped.
    pub fn flush(&mut self) -> bool {
        if !self.buffer.is_full() {
            return false;
        }

        let replacement = self.next_storage();
        let full = match self.buffer.swap(replacement) {
            Ok(full) => full,
            // next_storage only yields storage of our capacity
            Err(_) => return false,
        };

        match self.sink.send(Batch::from_storage(full)) {
            Ok(()) => {
                self.stats.emitted += 1;
                true
            }
            Err(rejected) => {
                self.stats.dropped += 1;
                self.spare = Some(rejected.into_storage());
                false
            }
        }
    }

    fn next_storage(&mut self) -> Box<[f32]> {
        let capacity = self.buffer.capacity();
        if let Some(storage) = self.spare.take() {
            return storage;
        }
        match self.sink.reclaim() {
            Some(storage) if storage.len() == capacity => storage,
            _ => alloc_storage(capacity),
        }
    }

    /// Samples written since the last flush; never longer than `capacity() - 1`.
    pub fn pending(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Discards pending samples. Counters are kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
