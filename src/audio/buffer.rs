use std::ops::Deref;

/// Allocates zeroed storage for one batch. The only allocation the capture path makes.
pub(crate) fn alloc_storage(capacity: usize) -> Box<[f32]> {
    vec![0.0; capacity].into_boxed_slice()
}

/// Fixed-capacity sample storage with a write offset.
///
/// `0 <= offset <= capacity` always holds; the owner swaps the storage out once it
/// is full and the offset goes back to zero.
pub struct SampleBuffer {
    data: Box<[f32]>,
    offset: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: alloc_storage(capacity),
            offset: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_full(&self) -> bool {
        self.offset == self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Samples written since the last swap.
    pub fn as_slice(&self) -> &[f32] {
        &self.data[..self.offset]
    }

    /// Copies as much of `input` as fits and returns how many samples were taken.
    pub fn write(&mut self, input: &[f32]) -> usize {
        let count = input.len().min(self.remaining());
        self.data[self.offset..self.offset + count].copy_from_slice(&input[..count]);
        self.offset += count;
        count
    }

    /// Replaces the storage and resets the offset, handing back the old storage.
    ///
    /// `replacement` must have the same capacity; a mismatched one is rejected and
    /// returned unchanged in the `Err`.
    pub fn swap(&mut self, replacement: Box<[f32]>) -> Result<Box<[f32]>, Box<[f32]>> {
        if replacement.len() != self.data.len() {
            return Err(replacement);
        }
        self.offset = 0;
        Ok(std::mem::replace(&mut self.data, replacement))
    }

    /// Drops the written samples without touching the storage.
    pub fn clear(&mut self) {
        self.offset = 0;
    }
}

/// A completed, exactly-capacity block of samples.
///
/// Moving a `Batch` moves the storage; nothing is copied on handoff.
#[derive(Debug, PartialEq)]
pub struct Batch {
    samples: Box<[f32]>,
}

impl Batch {
    pub(crate) fn from_storage(samples: Box<[f32]>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Gives the storage back, e.g. to return it to the producer for reuse.
    pub fn into_storage(self) -> Box<[f32]> {
        self.samples
    }
}

impl Deref for Batch {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_stops_at_capacity() {
        let mut buffer = SampleBuffer::new(4);
        assert_eq!(buffer.write(&[1.0, 2.0, 3.0]), 3);
        assert_eq!(buffer.remaining(), 1);
        assert_eq!(buffer.write(&[4.0, 5.0]), 1);
        assert!(buffer.is_full());
        assert_eq!(buffer.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buffer.write(&[6.0]), 0);
    }

    #[test]
    fn swap_resets_offset_and_returns_old_storage() {
        let mut buffer = SampleBuffer::new(2);
        buffer.write(&[0.5, 0.25]);
        let old = buffer.swap(alloc_storage(2)).unwrap();
        assert_eq!(&*old, &[0.5, 0.25]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn swap_rejects_mismatched_storage() {
        let mut buffer = SampleBuffer::new(2);
        buffer.write(&[1.0]);
        let rejected = buffer.swap(alloc_storage(3)).unwrap_err();
        assert_eq!(rejected.len(), 3);
        assert_eq!(buffer.offset(), 1);
    }
}
