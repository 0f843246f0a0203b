//! Growable circular FIFO for reassembling fragmented transport reads.
//!
//! Bytes are appended at the logical tail and read from the logical head.
//! When an append would overflow, storage is reallocated (at least doubling)
//! and the unconsumed bytes are copied into natural order at offset 0.
//! Capacity never shrinks.

use crate::error::ProtocolError;

/// Default initial capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4;

/// A growable circular byte FIFO.
#[derive(Debug, Clone)]
pub struct StreamBuffer {
    data: Vec<u8>,
    start: usize,
    len: usize,
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl StreamBuffer {
    /// Create a buffer with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        StreamBuffer {
            data: vec![0; capacity],
            start: 0,
            len: 0,
        }
    }

    /// Number of unconsumed bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no unconsumed bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current storage capacity.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Append bytes at the tail, growing storage if needed.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        let free = self.capacity() - self.len;
        if bytes.len() > free {
            let required = self.len + bytes.len();
            self.reallocate(required.max(self.capacity() * 2));
        }

        let capacity = self.capacity();
        let tail = (self.start + self.len) % capacity;
        let first = bytes.len().min(capacity - tail);
        self.data[tail..tail + first].copy_from_slice(&bytes[..first]);
        self.data[..bytes.len() - first].copy_from_slice(&bytes[first..]);
        self.len += bytes.len();
    }

    /// Byte at logical offset `index`, if buffered.
    pub fn get(&self, index: usize) -> Option<u8> {
        if index < self.len {
            Some(self.data[(self.start + index) % self.capacity()])
        } else {
            None
        }
    }

    /// Copy the first `n` bytes without removing them.
    pub fn peek(&self, n: usize) -> Result<Vec<u8>, ProtocolError> {
        if n > self.len {
            return Err(ProtocolError::InsufficientData {
                requested: n,
                available: self.len,
            });
        }

        let mut out = vec![0; n];
        self.copy_front(&mut out);
        Ok(out)
    }

    /// Remove and return the first `n` bytes.
    pub fn consume(&mut self, n: usize) -> Result<Vec<u8>, ProtocolError> {
        let out = self.peek(n)?;
        self.advance(n);
        Ok(out)
    }

    /// Drop up to `n` bytes from the head without copying them out.
    ///
    /// Returns the number of bytes dropped.
    pub fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        self.advance(n);
        n
    }

    /// Snapshot of all unconsumed bytes in order.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0; self.len];
        self.copy_front(&mut out);
        out
    }

    /// Drop everything. Capacity is kept.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    fn advance(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.start = (self.start + n) % self.capacity();
        self.len -= n;
        if self.len == 0 {
            self.start = 0;
        }
    }

    /// Fill `out` from the head. `out.len()` must not exceed `self.len`.
    fn copy_front(&self, out: &mut [u8]) {
        if out.is_empty() {
            return;
        }
        let capacity = self.capacity();
        let first = out.len().min(capacity - self.start);
        out[..first].copy_from_slice(&self.data[self.start..self.start + first]);
        let rest = out.len() - first;
        out[first..].copy_from_slice(&self.data[..rest]);
    }

    fn reallocate(&mut self, new_capacity: usize) {
        let mut data = vec![0; new_capacity];
        self.copy_front(&mut data[..self.len]);
        self.data = data;
        self.start = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_consume() {
        let mut buffer = StreamBuffer::new();
        assert!(buffer.is_empty());

        buffer.append(&[1, 2, 3]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.consume(2).unwrap(), vec![1, 2]);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.consume(1).unwrap(), vec![3]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut buffer = StreamBuffer::new();
        buffer.append(&[9, 8, 7]);
        assert_eq!(buffer.peek(2).unwrap(), vec![9, 8]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get(2), Some(7));
        assert_eq!(buffer.get(3), None);
    }

    #[test]
    fn test_peek_insufficient_data() {
        let mut buffer = StreamBuffer::new();
        buffer.append(&[1]);
        assert_eq!(
            buffer.peek(2),
            Err(ProtocolError::InsufficientData {
                requested: 2,
                available: 1
            })
        );
        assert!(buffer.consume(5).is_err());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_wraparound_without_growth() {
        let mut buffer = StreamBuffer::with_capacity(4);
        buffer.append(&[1, 2, 3]);
        buffer.consume(2).unwrap();
        // Tail wraps to the front of storage.
        buffer.append(&[4, 5, 6]);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.to_vec(), vec![3, 4, 5, 6]);
        assert_eq!(buffer.consume(4).unwrap(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_growth_preserves_wrapped_order() {
        let mut buffer = StreamBuffer::with_capacity(4);
        buffer.append(&[1, 2, 3, 4]);
        buffer.consume(3).unwrap();
        buffer.append(&[5, 6]);
        // Contents now wrap around the end of storage; force a reallocation.
        buffer.append(&[7, 8, 9, 10, 11]);
        assert!(buffer.capacity() >= 8);
        assert_eq!(buffer.to_vec(), vec![4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_growth_at_least_doubles() {
        let mut buffer = StreamBuffer::with_capacity(4);
        buffer.append(&[0; 5]);
        assert_eq!(buffer.capacity(), 8);
        buffer.append(&[0; 20]);
        assert_eq!(buffer.capacity(), 25);
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer = StreamBuffer::with_capacity(0);
        assert_eq!(buffer.consume(0).unwrap(), Vec::<u8>::new());
        buffer.append(&[1, 2]);
        assert_eq!(buffer.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_discard_and_clear() {
        let mut buffer = StreamBuffer::new();
        buffer.append(&[1, 2, 3, 4, 5]);
        assert_eq!(buffer.discard(2), 2);
        assert_eq!(buffer.to_vec(), vec![3, 4, 5]);
        assert_eq!(buffer.discard(10), 3);
        assert!(buffer.is_empty());

        buffer.append(&[6, 7]);
        let capacity = buffer.capacity();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_never_shrinks() {
        let mut buffer = StreamBuffer::with_capacity(2);
        buffer.append(&[0; 64]);
        buffer.consume(64).unwrap();
        assert_eq!(buffer.capacity(), 64);
    }
}
