//! Synchronization context: counting semaphores and the shared belt.
//!
//! The belt couples a ring buffer with the classic two-semaphore
//! bounded-buffer protocol:
//!
//! - `free_slots` starts at the usable capacity, `used_slots` at zero
//! - producers: acquire free → push under lock → release used
//! - consumers: acquire used → pop under lock → release free
//!
//! The semaphores are the only admission control. A buffer call made
//! while holding the matching permit cannot fail; the belt treats a
//! failure there as a protocol defect, not a runtime condition.
//!
//! Shutdown is cooperative but prompt: raising a stop flag also closes
//! the semaphore that role blocks on, so a waiter parked inside
//! `acquire()` wakes and observes the close instead of sleeping until
//! the next permit happens to arrive.

use crate::error::Result;
use crate::ring::{Item, RingBuffer};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// Semaphore
// ============================================================================

struct SemState {
    permits: usize,
    closed: bool,
}

/// Counting semaphore with close-to-wake shutdown support.
pub struct Semaphore {
    state: Mutex<SemState>,
    cond: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(SemState {
                permits,
                closed: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Take one permit, blocking while none are available.
    ///
    /// Returns `false` once the semaphore has been closed; close wins
    /// over remaining permits so shutdown is observed immediately.
    pub fn acquire(&self) -> bool {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return false;
            }
            if state.permits > 0 {
                state.permits -= 1;
                return true;
            }
            self.cond.wait(&mut state);
        }
    }

    /// Return one permit, waking a single waiter if any.
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.permits += 1;
        drop(state);
        self.cond.notify_one();
    }

    /// Close the semaphore and wake every waiter. Permit count is
    /// untouched, so accounting invariants hold through shutdown.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        drop(state);
        self.cond.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Current permit count. For introspection and invariant checks.
    pub fn permits(&self) -> usize {
        self.state.lock().permits
    }
}

// ============================================================================
// Belt - shared ring + semaphores + stop flags
// ============================================================================

/// Shared state for one simulation run: the ring buffer, its lock, the
/// two flow-control semaphores, and the shutdown flags.
///
/// Each task holds an `Arc<Belt>`; the belt is torn down only after the
/// last task drops its handle.
pub struct Belt {
    free_slots: Semaphore,
    used_slots: Semaphore,
    ring: Mutex<RingBuffer>,
    stop_producers: AtomicBool,
    stop_consumers: AtomicBool,
}

impl Belt {
    /// Create a belt over a ring with `capacity` storage slots.
    pub fn new(capacity: usize) -> Result<Self> {
        let ring = RingBuffer::new(capacity)?;
        Ok(Self {
            free_slots: Semaphore::new(ring.usable_capacity()),
            used_slots: Semaphore::new(0),
            ring: Mutex::new(ring),
            stop_producers: AtomicBool::new(false),
            stop_consumers: AtomicBool::new(false),
        })
    }

    /// Producer half of the protocol. Blocks for a free slot, inserts
    /// under the lock, then signals an occupied slot.
    ///
    /// Returns `false` when producer shutdown was requested.
    pub fn produce(&self, item: Item) -> bool {
        if !self.free_slots.acquire() {
            return false;
        }
        {
            let mut ring = self.ring.lock();
            let pushed = ring.try_push(item);
            debug_assert!(pushed, "free-slot permit held but ring was full");
        }
        self.used_slots.release();
        true
    }

    /// Consumer half of the protocol. Blocks for an occupied slot,
    /// removes under the lock, then signals a free slot.
    ///
    /// Returns `None` when consumer shutdown was requested.
    pub fn consume(&self) -> Option<Item> {
        if !self.used_slots.acquire() {
            return None;
        }
        let item = {
            let mut ring = self.ring.lock();
            let popped = ring.try_pop();
            debug_assert!(popped.is_some(), "used-slot permit held but ring was empty");
            popped?
        };
        self.free_slots.release();
        Some(item)
    }

    /// Stop producers: raise the flag and wake anyone parked on a free
    /// slot. Controller-only.
    pub fn stop_producers(&self) {
        self.stop_producers.store(true, Ordering::Release);
        self.free_slots.close();
    }

    /// Stop consumers: raise the flag and wake anyone parked on an
    /// occupied slot. Controller-only.
    pub fn stop_consumers(&self) {
        self.stop_consumers.store(true, Ordering::Release);
        self.used_slots.close();
    }

    pub fn producers_stopped(&self) -> bool {
        self.stop_producers.load(Ordering::Acquire)
    }

    pub fn consumers_stopped(&self) -> bool {
        self.stop_consumers.load(Ordering::Acquire)
    }

    /// Items currently resident in the ring.
    pub fn occupancy(&self) -> usize {
        self.ring.lock().len()
    }

    /// Maximum resident items.
    pub fn usable_capacity(&self) -> usize {
        self.ring.lock().usable_capacity()
    }

    /// Free-slot permit count. For invariant checks.
    pub fn free_permits(&self) -> usize {
        self.free_slots.permits()
    }

    /// Occupied-slot permit count. For invariant checks.
    pub fn used_permits(&self) -> usize {
        self.used_slots.permits()
    }
}
