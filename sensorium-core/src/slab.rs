//! Bounded Slab Pool with Stable Indices
#![allow(unsafe_code)] // Required for lock-free atomic operations
//!
//! ## Overview
//!
//! Fixed-capacity object pool backing the request table and the internal
//! event pool. Unlike a growable collection, the slab never allocates:
//! all `N` slots exist up front, a slot's index is stable for the lifetime
//! of the record stored in it, and exhaustion is an ordinary result the
//! caller handles.
//!
//! ## Why not a ring buffer?
//!
//! A `heapless::spsc::Queue`-style ring works when records are consumed in
//! FIFO order. Slab records are not: a client request lives until that
//! client releases it, and a set-rate payload lives until the receiving
//! task is done with it. Lifetimes overlap arbitrarily, so slots must be
//! individually claimable and freeable.
//!
//! ## Algorithm
//!
//! Each slot carries an atomic state:
//!
//! ```text
//! FREE ──CAS──► CLAIMED ──write value──► LIVE (release)
//!   ▲                                      │
//!   └────────────── store (release) ───────┘
//! ```
//!
//! - `insert` scans for a `FREE` slot, claims it by CAS (so concurrent
//!   inserters never collide), writes the value, then publishes with a
//!   release store of `LIVE`.
//! - `get`/`iter` acquire-load the state and only read the value behind
//!   `LIVE`, so a reader never observes a partially written record:
//!   either the slot is live with its full value visible, or it is
//!   skipped.
//! - `free` release-stores `FREE`. Callers that can race scanners
//!   overwrite the record with neutral values first (the request table
//!   does), preserving the "live implies meaningful" reading.
//!
//! ## Memory Ordering
//!
//! - **Acquire** on state loads: a reader that sees `LIVE` also sees the
//!   value written before the release.
//! - **Release** on publish/free: value writes are visible before the
//!   state flips.
//! - CAS claims use Acquire success ordering; the claimant is the only
//!   writer until it publishes, so nothing stronger is needed.
//!
//! ## Safety Considerations
//!
//! `T: Copy` keeps the pool trivial: records are plain data, reads are
//! copies, and freeing a slot never needs to run destructors. Mutation of
//! a live slot (`set`) is reserved to the manager's single execution
//! context; concurrent use is limited to `insert` and `free`, which
//! synchronize through the per-slot state.
//!
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

const FREE: u8 = 0;
const CLAIMED: u8 = 1;
const LIVE: u8 = 2;

struct Slot<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Fixed pool of `N` copyable records with stable indices.
pub struct Slab<T: Copy, const N: usize> {
    slots: [Slot<T>; N],
}

impl<T: Copy, const N: usize> Slab<T, N> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot {
                state: AtomicU8::new(FREE),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            }),
        }
    }

    /// Capacity in records.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Claim a slot, store `value`, publish it. Returns the slot index,
    /// or `None` when the pool is exhausted.
    pub fn insert(&self, value: T) -> Option<usize> {
        for (i, slot) in self.slots.iter().enumerate() {
            if slot
                .state
                .compare_exchange(FREE, CLAIMED, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                // Sole writer between CLAIMED and the release below.
                unsafe { (*slot.value.get()).write(value) };
                slot.state.store(LIVE, Ordering::Release);
                return Some(i);
            }
        }
        None
    }

    /// Copy out the record at `index`, if that slot is live.
    pub fn get(&self, index: usize) -> Option<T> {
        let slot = self.slots.get(index)?;
        if slot.state.load(Ordering::Acquire) == LIVE {
            // Acquire pairs with the release in `insert`/`set`: the value
            // write is visible once LIVE is observed.
            Some(unsafe { (*slot.value.get()).assume_init_read() })
        } else {
            None
        }
    }

    /// Overwrite the record at `index`. Returns false if the slot is not
    /// live. Callers serialize `set` against readers through the
    /// manager's execution context.
    pub fn set(&self, index: usize, value: T) -> bool {
        let Some(slot) = self.slots.get(index) else {
            return false;
        };
        if slot.state.load(Ordering::Acquire) != LIVE {
            return false;
        }
        unsafe { (*slot.value.get()).write(value) };
        slot.state.store(LIVE, Ordering::Release);
        true
    }

    /// Return the slot at `index` to the pool. Returns false if it was
    /// not live.
    pub fn free(&self, index: usize) -> bool {
        let Some(slot) = self.slots.get(index) else {
            return false;
        };
        if slot.state.load(Ordering::Acquire) != LIVE {
            return false;
        }
        slot.state.store(FREE, Ordering::Release);
        true
    }

    /// Count of live records.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state.load(Ordering::Acquire) == LIVE)
            .count()
    }

    /// True when no record is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live records in slot order, copying each out.
    ///
    /// This is the dense scan the aggregator runs; slot order is an
    /// implementation detail and not observable through the manager API.
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        (0..N).filter_map(move |i| self.get(i).map(|v| (i, v)))
    }
}

impl<T: Copy, const N: usize> Default for Slab<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

// The per-slot atomic state serializes publication and reclamation;
// records are Copy so no slot ever owns a resource.
unsafe impl<T: Copy + Send, const N: usize> Send for Slab<T, N> {}
unsafe impl<T: Copy + Send, const N: usize> Sync for Slab<T, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_free() {
        let slab: Slab<u32, 4> = Slab::new();
        let a = slab.insert(11).unwrap();
        let b = slab.insert(22).unwrap();
        assert_ne!(a, b);
        assert_eq!(slab.get(a), Some(11));
        assert_eq!(slab.get(b), Some(22));
        assert_eq!(slab.len(), 2);

        assert!(slab.free(a));
        assert_eq!(slab.get(a), None);
        assert!(!slab.free(a));
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn exhaustion_and_reuse() {
        let slab: Slab<u8, 2> = Slab::new();
        let a = slab.insert(1).unwrap();
        let _b = slab.insert(2).unwrap();
        assert_eq!(slab.insert(3), None);

        slab.free(a);
        // Freed slot is reusable and keeps a stable index.
        assert_eq!(slab.insert(4), Some(a));
    }

    #[test]
    fn iter_skips_free_slots() {
        let slab: Slab<u32, 4> = Slab::new();
        let a = slab.insert(5).unwrap();
        let b = slab.insert(6).unwrap();
        let c = slab.insert(7).unwrap();
        slab.free(b);

        let live: std::vec::Vec<_> = slab.iter().collect();
        assert_eq!(live, std::vec![(a, 5), (c, 7)]);
    }

    #[test]
    fn set_requires_live_slot() {
        let slab: Slab<u32, 2> = Slab::new();
        assert!(!slab.set(0, 9));
        let a = slab.insert(1).unwrap();
        assert!(slab.set(a, 9));
        assert_eq!(slab.get(a), Some(9));
    }

    #[cfg(feature = "std")]
    #[test]
    fn concurrent_insert_never_collides() {
        use std::sync::Arc;

        let slab: Arc<Slab<u64, 64>> = Arc::new(Slab::new());
        let mut joins = std::vec::Vec::new();
        for t in 0..4u64 {
            let slab = Arc::clone(&slab);
            joins.push(std::thread::spawn(move || {
                let mut got = std::vec::Vec::new();
                for i in 0..16u64 {
                    if let Some(idx) = slab.insert(t * 100 + i) {
                        got.push(idx);
                    }
                }
                got
            }));
        }
        let mut all: std::vec::Vec<usize> =
            joins.into_iter().flat_map(|j| j.join().unwrap()).collect();
        all.sort_unstable();
        let before = all.len();
        all.dedup();
        assert_eq!(before, all.len(), "two threads claimed the same slot");
        assert_eq!(slab.len(), before);
    }
}
