//! One-way batch handoff from the real-time context to a consumer.
//!
//! `BatchSink::send` takes the batch by value, so once a batch is sent the
//! producer cannot reach its storage again. The native channel also carries a
//! return lane: the consumer hands storage back and the producer reuses it for
//! the next buffer instead of allocating.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

use crate::audio::Batch;

/// Destination for completed batches.
pub trait BatchSink {
    /// Delivers `batch` without blocking. A batch that cannot be delivered right
    /// now comes back in the `Err`.
    fn send(&mut self, batch: Batch) -> Result<(), Batch>;

    /// Storage released by the consumer, if any is waiting.
    fn reclaim(&mut self) -> Option<Box<[f32]>> {
        None
    }
}

/// Unbounded collector, mostly useful for offline rendering and tests.
impl BatchSink for Vec<Batch> {
    fn send(&mut self, batch: Batch) -> Result<(), Batch> {
        self.push(batch);
        Ok(())
    }
}

/// Producer half of [`batch_channel`]. Lives on the audio thread.
pub struct BatchSender {
    batches: HeapProducer<Batch>,
    returns: HeapConsumer<Box<[f32]>>,
}

/// Consumer half of [`batch_channel`].
pub struct BatchReceiver {
    batches: HeapConsumer<Batch>,
    returns: HeapProducer<Box<[f32]>>,
}

/// Creates a lock-free SPSC channel holding up to `depth` batches in flight.
pub fn batch_channel(depth: usize) -> (BatchSender, BatchReceiver) {
    let depth = depth.max(1);
    let (batch_tx, batch_rx) = HeapRb::<Batch>::new(depth).split();
    let (return_tx, return_rx) = HeapRb::<Box<[f32]>>::new(depth).split();

    (
        BatchSender {
            batches: batch_tx,
            returns: return_rx,
        },
        BatchReceiver {
            batches: batch_rx,
            returns: return_tx,
        },
    )
}

impl BatchSink for BatchSender {
    fn send(&mut self, batch: Batch) -> Result<(), Batch> {
        self.batches.push(batch)
    }

    fn reclaim(&mut self) -> Option<Box<[f32]>> {
        self.returns.pop()
    }
}

impl BatchReceiver {
    /// Next batch in FIFO order, if one has arrived.
    pub fn try_recv(&mut self) -> Option<Batch> {
        self.batches.pop()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Returns a consumed batch's storage to the producer.
    ///
    /// If the return lane is full the storage is simply dropped here, on the
    /// consumer side.
    pub fn recycle(&mut self, batch: Batch) {
        let _ = self.returns.push(batch.into_storage());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_of(value: f32, len: usize) -> Batch {
        Batch::from_storage(vec![value; len].into_boxed_slice())
    }

    #[test]
    fn delivers_in_fifo_order() {
        let (mut tx, mut rx) = batch_channel(4);
        for i in 0..3 {
            tx.send(batch_of(i as f32, 8)).unwrap();
        }
        assert_eq!(rx.len(), 3);
        for i in 0..3 {
            let batch = rx.try_recv().unwrap();
            assert_eq!(batch[0], i as f32);
        }
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn full_channel_hands_batch_back() {
        let (mut tx, _rx) = batch_channel(1);
        tx.send(batch_of(1.0, 4)).unwrap();
        let rejected = tx.send(batch_of(2.0, 4)).unwrap_err();
        assert_eq!(rejected[0], 2.0);
    }

    #[test]
    fn recycled_storage_comes_back_to_sender() {
        let (mut tx, mut rx) = batch_channel(2);
        assert!(tx.reclaim().is_none());

        tx.send(batch_of(0.5, 16)).unwrap();
        let batch = rx.try_recv().unwrap();
        let ptr = batch.as_ptr();
        rx.recycle(batch);

        let storage = tx.reclaim().unwrap();
        assert_eq!(storage.as_ptr(), ptr);
        assert_eq!(storage.len(), 16);
    }

    #[test]
    fn zero_depth_is_clamped() {
        let (mut tx, mut rx) = batch_channel(0);
        tx.send(batch_of(1.0, 2)).unwrap();
        assert!(rx.try_recv().is_some());
    }
}
