//! Sensor Registry: Slot Allocation and Handle Publication
#![allow(unsafe_code)] // Required for lock-free atomic operations
//!
//! ## Overview
//!
//! Fixed array of sensor slots. Registration claims a slot, mints a
//! process-unique handle, fills the slot in, and *publishes* it by storing
//! the nonzero handle; lookup scans handles. Registration and
//! unregistration are callable from any context (drivers typically
//! register during their own init, not on the manager's execution
//! context), while everything that mutates a sensor's runtime state stays
//! on that single context.
//!
//! ## Publication protocol
//!
//! ```text
//! registrant                               reader (any context)
//! ──────────                               ────────────────────
//! claim slot (CAS)
//! write info/driver/state
//! handle.store(h, Release)  ───────────►  handle.load(Acquire) == h
//!                                          ⇒ info/driver/state visible
//! ```
//!
//! A reader that observes a nonzero handle is guaranteed the fully
//! initialized record; a reader that observes zero skips the slot. The
//! reverse runs at unregistration: the handle is zeroed (release) before
//! the claim is returned, so a concurrent reader either misses the sensor
//! or sees the complete live record, never a partial one.
//!
//! ## Handle minting
//!
//! Handles come from a wrapping 32-bit counter, skipping zero and any
//! value currently live. The confirmation scan is safe without a lock:
//! another registrant cannot have "just" taken the same value, because it
//! would have to advance the shared counter all the way around 32 bits
//! between our increment and our scan.
//!
//! ## Unregistration contract
//!
//! Unregistering does not quiesce in-flight work. The caller (the driver
//! that owns the sensor) must ensure no operations on the handle are still
//! executing; in practice: stop signaling events, then unregister.
//! Request-table records left behind by clients are inert: they can only
//! ever match the now-dead handle, and their owners may release them at
//! any time.

use core::cell::{Cell, UnsafeCell};
use core::mem::MaybeUninit;
use core::num::NonZeroU32;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::driver::DriverRef;
use crate::errors::{Error, ManagerResult};
use crate::info::{SensorInfo, SensorKind};
use crate::state::SensorState;

/// Identifier of a registered sensor.
///
/// Nonzero by construction: the all-zero wire value used for "no sensor"
/// is unrepresentable, so a lookup by `Handle` can never accidentally
/// match a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Raw wire value.
    pub const fn raw(self) -> u32 {
        self.0.get()
    }

    /// Reconstruct a handle from its wire value. Zero is not a handle.
    pub const fn from_raw(raw: u32) -> Option<Handle> {
        match NonZeroU32::new(raw) {
            Some(n) => Some(Handle(n)),
            None => None,
        }
    }
}

/// Payload of a live slot. Only the manager's execution context touches
/// `state` after publication.
pub(crate) struct SlotData {
    pub(crate) info: &'static SensorInfo,
    pub(crate) driver: DriverRef,
    pub(crate) state: Cell<SensorState>,
}

struct RegSlot {
    /// Slot allocation flag; the atomic-bitset role.
    claimed: AtomicBool,
    /// Publication word: 0 = not published, nonzero = live handle.
    handle: AtomicU32,
    data: UnsafeCell<MaybeUninit<SlotData>>,
}

/// Registry of up to `N` sensors.
pub(crate) struct Registry<const N: usize> {
    slots: [RegSlot; N],
    next_handle: AtomicU32,
}

impl<const N: usize> Registry<N> {
    pub(crate) fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| RegSlot {
                claimed: AtomicBool::new(false),
                handle: AtomicU32::new(0),
                data: UnsafeCell::new(MaybeUninit::uninit()),
            }),
            next_handle: AtomicU32::new(0),
        }
    }

    /// Register a sensor; fails when every slot is claimed.
    pub(crate) fn register(
        &self,
        info: &'static SensorInfo,
        driver: DriverRef,
    ) -> ManagerResult<Handle> {
        let idx = self.claim_slot().ok_or(Error::RegistryFull)?;
        let handle = self.mint_handle();

        let slot = &self.slots[idx];
        // Sole writer: the slot is claimed but not yet published.
        unsafe {
            (*slot.data.get()).write(SlotData {
                info,
                driver,
                state: Cell::new(SensorState::Off),
            });
        }
        slot.handle.store(handle.get(), Ordering::Release);

        Ok(Handle(handle))
    }

    /// Retract a sensor. See the module docs for the quiescence contract.
    pub(crate) fn unregister(&self, handle: Handle) -> ManagerResult<()> {
        let idx = self.find_slot(handle.raw()).ok_or(Error::UnknownHandle)?;
        let slot = &self.slots[idx];
        // Retract before releasing the claim, mirroring publication.
        slot.handle.store(0, Ordering::Release);
        slot.claimed.store(false, Ordering::Release);
        Ok(())
    }

    /// Run `f` against the live record for `handle`, if any.
    ///
    /// The closure receives a shared view; runtime-state mutation goes
    /// through the `Cell` and is reserved to the manager's execution
    /// context.
    pub(crate) fn with<F, R>(&self, handle: Handle, f: F) -> Option<R>
    where
        F: FnOnce(&SlotData) -> R,
    {
        let idx = self.find_slot(handle.raw())?;
        // Acquire on the handle load pairs with the release store in
        // `register`: the record write is visible.
        let data = unsafe { (*self.slots[idx].data.get()).assume_init_ref() };
        Some(f(data))
    }

    /// The `nth` live sensor of `kind`, in slot order.
    pub(crate) fn find_by_kind(
        &self,
        kind: SensorKind,
        nth: usize,
    ) -> Option<(&'static SensorInfo, Handle)> {
        let mut remaining = nth;
        for slot in &self.slots {
            let raw = slot.handle.load(Ordering::Acquire);
            let Some(handle) = Handle::from_raw(raw) else {
                continue;
            };
            let data = unsafe { (*slot.data.get()).assume_init_ref() };
            if data.info.kind == kind {
                if remaining == 0 {
                    return Some((data.info, handle));
                }
                remaining -= 1;
            }
        }
        None
    }

    /// Snapshot of all live handles, in slot order.
    pub(crate) fn live_handles(&self) -> heapless::Vec<Handle, N> {
        let mut out = heapless::Vec::new();
        for slot in &self.slots {
            if let Some(h) = Handle::from_raw(slot.handle.load(Ordering::Acquire)) {
                // Cannot overflow: at most N slots.
                let _ = out.push(h);
            }
        }
        out
    }

    /// Number of claimed slots (live or mid-registration).
    #[cfg(test)]
    pub(crate) fn claimed_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.claimed.load(Ordering::Acquire))
            .count()
    }

    fn claim_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| {
            s.claimed
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
        })
    }

    fn find_slot(&self, raw: u32) -> Option<usize> {
        if raw == 0 {
            return None;
        }
        (0..N).find(|&i| self.slots[i].handle.load(Ordering::Acquire) == raw)
    }

    fn mint_handle(&self) -> NonZeroU32 {
        loop {
            let raw = self
                .next_handle
                .fetch_add(1, Ordering::Relaxed)
                .wrapping_add(1);
            if let Some(h) = NonZeroU32::new(raw) {
                if self.find_slot(raw).is_none() {
                    return h;
                }
            }
        }
    }
}

// Publication discipline above; `Cell<SensorState>` is confined to the
// manager's execution context per the crate's concurrency contract.
unsafe impl<const N: usize> Send for Registry<N> {}
unsafe impl<const N: usize> Sync for Registry<N> {}
