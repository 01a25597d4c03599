//! Event Runtime Seam
//!
//! ## Overview
//!
//! The manager never owns a thread or an executor. Everything asynchronous
//! goes through a [`Runtime`] supplied at construction, which must provide
//! two primitives:
//!
//! - [`defer`](Runtime::defer): schedule an internal event for later
//!   delivery **on the manager's execution context**. The runtime calls
//!   [`SensorManager::deliver`](crate::manager::SensorManager::deliver)
//!   with the token when that context next runs. This is the
//!   serialization point that makes the whole state machine single-threaded.
//! - [`post`](Runtime::post): enqueue a [`TaskMessage`] to an
//!   out-of-process driver task. Success means enqueued, not handled.
//!
//! Both primitives are non-blocking and may refuse (queue full, task
//! gone); the manager treats refusal as a synchronous failure and never
//! waits.
//!
//! ## Ordering
//!
//! Deferred events must be delivered in the order they were accepted, at
//! least per sensor; the state machine's correctness argument ("within a
//! single sensor, all transitions are totally ordered") is really a
//! property of this queue. A FIFO satisfies it trivially.

use crate::driver::TaskId;
use crate::events::EvtToken;
use crate::rate::{Latency, Rate};

/// Driver-bound message for an out-of-process sensor driver.
///
/// One variant per driver operation, mirroring
/// [`SensorOps`](crate::driver::SensorOps).
#[derive(Debug)]
pub enum TaskMessage {
    /// Request a power transition.
    Power {
        /// Desired power state.
        on: bool,
    },
    /// Start a firmware upload.
    FirmwareUpload,
    /// Request a rate/latency change.
    ///
    /// Carries the pool token backing this payload; the consumer must
    /// return it via
    /// [`SensorManager::recycle`](crate::manager::SensorManager::recycle)
    /// once the message has been acted on.
    SetRate {
        /// Requested rate.
        rate: Rate,
        /// Requested batching latency.
        latency: Latency,
        /// Pool slot backing this dispatch.
        token: EvtToken,
    },
    /// Flush batched samples.
    Flush,
    /// Produce one on-demand sample.
    Trigger,
}

/// The manager's window onto the hub's event system.
pub trait Runtime {
    /// Schedule `evt` for delivery on the manager's execution context.
    ///
    /// Returns false if the event could not be queued; the caller frees
    /// the backing pool slot and reports the failure synchronously.
    fn defer(&self, evt: EvtToken) -> bool;

    /// Enqueue a private driver event addressed to `task`.
    ///
    /// Returns false if the message could not be queued.
    fn post(&self, task: TaskId, msg: TaskMessage) -> bool;
}

impl<T: Runtime + ?Sized> Runtime for &T {
    fn defer(&self, evt: EvtToken) -> bool {
        (**self).defer(evt)
    }

    fn post(&self, task: TaskId, msg: TaskMessage) -> bool {
        (**self).post(task, msg)
    }
}
