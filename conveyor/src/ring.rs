//! Fixed-capacity circular buffer.
//!
//! The ring is deliberately non-blocking: flow control lives in the
//! `Belt` semaphores, mutual exclusion in the `Belt` lock. One storage
//! slot is sacrificed so full and empty are distinguishable from the
//! cursors alone, giving `capacity - 1` usable slots.

use crate::error::{ConveyorError, Result};

/// Item handed from producers to consumers. Opaque beyond its value.
pub type Item = u64;

/// Default storage capacity (4 usable slots).
pub const DEFAULT_CAPACITY: usize = 5;

pub struct RingBuffer {
    slots: Box<[Item]>,
    write_idx: usize,
    read_idx: usize,
}

impl RingBuffer {
    /// Create a ring with `capacity` storage slots (`capacity - 1` usable).
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(ConveyorError::config(
                "ring capacity must be at least 2 (one slot is reserved)",
            ));
        }
        Ok(Self {
            slots: vec![0; capacity].into_boxed_slice(),
            write_idx: 0,
            read_idx: 0,
        })
    }

    /// Append one item. Fails without side effects when full.
    pub fn try_push(&mut self, item: Item) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[self.write_idx] = item;
        self.write_idx = (self.write_idx + 1) % self.slots.len();
        true
    }

    /// Remove the oldest item. Fails without side effects when empty.
    pub fn try_pop(&mut self) -> Option<Item> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.read_idx];
        self.read_idx = (self.read_idx + 1) % self.slots.len();
        Some(item)
    }

    pub fn is_empty(&self) -> bool {
        self.write_idx == self.read_idx
    }

    pub fn is_full(&self) -> bool {
        (self.write_idx + 1) % self.slots.len() == self.read_idx
    }

    /// Items currently resident.
    pub fn len(&self) -> usize {
        let cap = self.slots.len();
        (self.write_idx + cap - self.read_idx) % cap
    }

    /// Storage slots, including the reserved one.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Maximum resident items: `capacity() - 1`.
    pub fn usable_capacity(&self) -> usize {
        self.slots.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_tiny_capacity() {
        assert!(RingBuffer::new(0).is_err());
        assert!(RingBuffer::new(1).is_err());
        assert!(RingBuffer::new(2).is_ok());
    }

    #[test]
    fn test_usable_capacity_is_one_less_than_storage() {
        let ring = RingBuffer::new(5).unwrap();
        assert_eq!(ring.capacity(), 5);
        assert_eq!(ring.usable_capacity(), 4);
    }

    #[test]
    fn test_push_until_full() {
        let mut ring = RingBuffer::new(5).unwrap();
        for i in 0..4 {
            assert!(ring.try_push(i), "push {} should fit", i);
        }
        assert!(ring.is_full());
        assert!(!ring.try_push(99));
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_pop_empty_fails_without_side_effects() {
        let mut ring = RingBuffer::new(5).unwrap();
        assert!(ring.try_pop().is_none());
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn test_fifo_order() {
        let mut ring = RingBuffer::new(5).unwrap();
        for item in [3, 7, 1] {
            assert!(ring.try_push(item));
        }
        assert_eq!(ring.try_pop(), Some(3));
        assert_eq!(ring.try_pop(), Some(7));
        assert_eq!(ring.try_pop(), Some(1));
        assert_eq!(ring.try_pop(), None);
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let mut ring = RingBuffer::new(3).unwrap();
        // Cycle enough times to wrap the cursors repeatedly.
        for round in 0u64..10 {
            assert!(ring.try_push(round * 2));
            assert!(ring.try_push(round * 2 + 1));
            assert_eq!(ring.try_pop(), Some(round * 2));
            assert_eq!(ring.try_pop(), Some(round * 2 + 1));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_failed_push_leaves_cursors_untouched() {
        let mut ring = RingBuffer::new(2).unwrap();
        assert!(ring.try_push(42));
        assert!(!ring.try_push(43));
        assert_eq!(ring.try_pop(), Some(42));
        assert!(ring.is_empty());
    }
}
