//! Internal Event Types
//!
//! ## Overview
//!
//! Two kinds of records share the manager's bounded internal event pool:
//!
//! 1. **Completions**: a driver reporting that a previously accepted
//!    operation finished ([`SensorEvent`]). These are allocated by
//!    [`signal_internal_evt`], deferred through the event runtime, and
//!    consumed by [`deliver`] on the manager's execution context.
//! 2. **Set-rate payloads**: rate/latency pairs in flight to an
//!    out-of-process driver task. The record exists so that dispatch to
//!    external tasks shares the same bounded budget as completions: when
//!    the pool is empty, set-rate dispatch fails and the next reconcile
//!    retries.
//!
//! Either way the pool slot is named by an [`EvtToken`]. Tokens are
//! move-only: a correct runtime hands each token back exactly once
//! (completions to [`deliver`], consumed set-rate payloads to
//! [`recycle`]), and the type system keeps it from doing so twice.
//!
//! [`signal_internal_evt`]: crate::manager::SensorManager::signal_internal_evt
//! [`deliver`]: crate::manager::SensorManager::deliver
//! [`recycle`]: crate::manager::SensorManager::recycle

use crate::rate::{Latency, Rate};
use crate::registry::Handle;

/// A driver-side completion report.
///
/// Drivers accept operations synchronously and report the real outcome
/// later with one of these. Delivery is serialized onto the manager's
/// execution context by the event runtime, so handlers never race the
/// client API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    /// The power state actually changed (or the driver re-confirmed it).
    PowerStateChanged {
        /// New power state.
        on: bool,
    },
    /// Firmware upload finished.
    FwStateChanged {
        /// `Some((rate, latency))`: upload succeeded and the sensor is
        /// running at that initial configuration. `None`: upload failed;
        /// the manager abandons this boot attempt and powers the sensor
        /// back down.
        result: Option<(Rate, Latency)>,
    },
    /// The hardware rate/latency actually changed.
    RateChanged {
        /// Rate now in effect; `Rate::Off` reports the sensor stopped.
        rate: Rate,
        /// Latency now in effect.
        latency: Latency,
    },
}

/// One slot's worth of pool payload.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EvtRecord {
    /// Deferred driver completion awaiting delivery.
    Completion { handle: Handle, event: SensorEvent },
    /// Set-rate payload in flight to an out-of-process driver.
    SetRate { rate: Rate, latency: Latency },
}

/// Opaque name of an internal event pool slot.
///
/// Move-only; see the module docs for the hand-back contract.
#[derive(Debug, PartialEq, Eq)]
pub struct EvtToken(u16);

impl EvtToken {
    pub(crate) fn new(index: usize) -> Self {
        EvtToken(index as u16)
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}
