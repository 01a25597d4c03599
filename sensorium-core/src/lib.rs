//! Sensorium Core - Sensor Manager for Embedded Sensor Hubs
//!
//! ## Overview
//!
//! Sensorium Core arbitrates between multiple client subscribers and a
//! fixed population of physical or virtual sensors on a sensor hub. It
//! keeps a registry of sensor drivers, accepts per-client rate/latency
//! requests against each sensor, computes the minimum hardware
//! configuration that satisfies every active client, and drives each
//! sensor through a power/firmware/rate state machine, recovering from
//! transitions the driver reports asynchronously, out of order, or in
//! contradiction with the latest request.
//!
//! The manager mediates *control* only. Sample delivery is the hub's data
//! path and never passes through this crate.
//!
//! ## Architecture & Design Philosophy
//!
//! ### 1. One Execution Context
//! All state-machine transitions and request-table mutations run on a
//! single cooperative execution context. Driver completions re-enter
//! through a deferral seam ([`Runtime`]) that serializes them onto the
//! same context, so the state machine needs no locks at all. Only
//! registration and the driver-side completion signal are cross-context,
//! and those touch nothing but lock-free structures.
//!
//! ### 2. Zero-Allocation Design
//! Every allocation is planned at compile time:
//! - Fixed sensor slot array with lock-free claim and publication
//! - Bounded request table (one record per live client-sensor pair)
//! - Bounded internal event pool shared between completions and
//!   out-of-process dispatch payloads
//!
//! Exhaustion is an ordinary, synchronously reported error; nothing
//! blocks and nothing grows.
//!
//! ### 3. Make Illegal States Unrepresentable
//! Transition markers (powering on, uploading firmware, ...) are
//! [`SensorState`] variants, not in-band magic rate values, so they cannot
//! leak into a driver call. A [`Handle`] is nonzero by construction, so
//! the "invalid handle" wire value cannot match a sensor. The infeasible
//! aggregate is an error, never a stored state.
//!
//! ### 4. Drivers Are Plug-Ins
//! A driver is either an in-process operations table called synchronously
//! or an out-of-process task reached by message ([`DriverRef`]). Both
//! accept operations and report completion later through
//! [`signal_internal_evt`](manager::SensorManager::signal_internal_evt);
//! the manager treats refusal as "retry on the next reconcile", never as
//! a fatal condition.
//!
//! ## Usage Example
//!
//! ```no_run
//! use sensorium_core::{
//!     ClientId, Latency, Rate, SensorInfo, SensorKind, SensorManager,
//! };
//! # use sensorium_core::{EvtToken, Runtime, TaskId, TaskMessage, SensorOps};
//! # struct NopRuntime;
//! # impl Runtime for NopRuntime {
//! #     fn defer(&self, _evt: EvtToken) -> bool { true }
//! #     fn post(&self, _task: TaskId, _msg: TaskMessage) -> bool { true }
//! # }
//! # struct NopOps;
//! # impl SensorOps for NopOps {
//! #     fn power(&self, _on: bool) -> bool { true }
//! #     fn firmware_upload(&self) -> bool { true }
//! #     fn set_rate(&self, _r: Rate, _l: Latency) -> bool { true }
//! #     fn flush(&self) -> bool { true }
//! #     fn trigger_ondemand(&self) -> bool { true }
//! # }
//! # static OPS: NopOps = NopOps;
//!
//! static ACCEL: SensorInfo = SensorInfo {
//!     name: "bmi160-accel",
//!     kind: SensorKind::Accelerometer,
//!     supported_rates: &[10_240, 51_200, 102_400],
//! };
//!
//! let manager: SensorManager<NopRuntime> = SensorManager::new(NopRuntime);
//! let handle = manager.register(&ACCEL, &OPS)?;
//!
//! // Client asks for ~40 Hz; the hardware will run at the next supported
//! // rate up once the driver completes power-up and firmware upload.
//! manager.request(ClientId(1), handle, Rate::Continuous(40_960), Latency::INVALID)?;
//! # Ok::<(), sensorium_core::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): standard library support for host-side use and tests
//! - `defmt`: defmt formatting for [`Error`] on embedded targets
//! - `log`: capacity/dispatch warnings through the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod driver;
pub mod errors;
pub mod events;
pub mod info;
pub mod manager;
pub mod rate;
pub mod runtime;
pub mod slab;
pub mod state;

mod aggregate;
mod registry;
mod table;

// Public API
pub use constants::{MAX_CLI_SENS_MATRIX_SZ, MAX_INTERNAL_EVENTS, MAX_REGISTERED_SENSORS};
pub use driver::{DriverRef, SensorOps, TaskId};
pub use errors::{Error, ManagerResult};
pub use events::{EvtToken, SensorEvent};
pub use info::{SensorInfo, SensorKind};
pub use manager::{ManagerStats, SensorManager};
pub use rate::{rate_units_from_hz, Latency, Rate};
pub use registry::Handle;
pub use runtime::{Runtime, TaskMessage};
pub use state::SensorState;
pub use table::ClientId;

/// Sensorium Core library version
///
/// Useful for runtime version checks and telemetry
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
