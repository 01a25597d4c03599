//! Driver Seam: Operations Table and Dispatch Reference
//!
//! ## Overview
//!
//! A sensor driver plugs into the manager in one of two shapes:
//!
//! 1. **In-process**: an operations table the manager calls synchronously
//!    ([`SensorOps`]). This is the common case for drivers living in the
//!    hub image itself.
//! 2. **Out-of-process**: a task elsewhere on the hub, reached by posting
//!    [`TaskMessage`](crate::runtime::TaskMessage)s through the event
//!    runtime, addressed by [`TaskId`].
//!
//! [`DriverRef`] is the tagged sum over the two. Dispatch is an exhaustive
//! match; there is no bit-tagged pointer to decode and no third case to
//! forget.
//!
//! ## Accept vs. complete
//!
//! Every operation returns a `bool` meaning *accepted*, not *done*. A
//! driver that accepts `power(true)` reports the actual transition later
//! through
//! [`signal_internal_evt`](crate::manager::SensorManager::signal_internal_evt);
//! the same goes for firmware upload and rate changes. For out-of-process
//! drivers even the acceptance is weaker: `true` means the message was
//! enqueued to the task, nothing more.

use crate::rate::{Latency, Rate};

/// Identifier of an out-of-process driver task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(
    /// Raw task identifier assigned by the hub OS.
    pub u32,
);

/// Synchronous operations table for an in-process driver.
///
/// Implementations must be `Sync`: the table is registered as a `'static`
/// reference and registration may happen off the manager's execution
/// context. The operations themselves are only invoked from the manager's
/// context and must not block; kick the hardware and report completion via
/// `signal_internal_evt`.
pub trait SensorOps: Sync {
    /// Request a power transition. Completion arrives as a
    /// power-state-changed event.
    fn power(&self, on: bool) -> bool;

    /// Start pushing firmware to the powered sensor. Completion arrives as
    /// a firmware-state-changed event.
    fn firmware_upload(&self) -> bool;

    /// Request a new sampling rate and batching latency. Completion
    /// arrives as a rate-changed event.
    fn set_rate(&self, rate: Rate, latency: Latency) -> bool;

    /// Flush any batched samples toward the clients.
    fn flush(&self) -> bool;

    /// Produce one sample for on-demand subscribers.
    fn trigger_ondemand(&self) -> bool;
}

/// How to reach a registered driver.
#[derive(Clone, Copy)]
pub enum DriverRef {
    /// In-process operations table, called synchronously.
    InProc(&'static dyn SensorOps),
    /// Out-of-process task, reached via the event runtime.
    Task(TaskId),
}

impl core::fmt::Debug for DriverRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DriverRef::InProc(_) => f.write_str("DriverRef::InProc(..)"),
            DriverRef::Task(tid) => write!(f, "DriverRef::Task({})", tid.0),
        }
    }
}
