//! The Sensor Manager
//!
//! ## Overview
//!
//! The manager is the in-process arbiter between client subscribers and
//! the hub's sensor drivers. A client call mutates the request table; the
//! aggregator recomputes the hardware target for the affected sensor; the
//! state machine compares target to current and issues at most one driver
//! operation to close the gap. Driver completions re-enter through the
//! event runtime and may re-reconcile:
//!
//! ```text
//!  client ──request/amend/release──► RequestTable
//!                                        │
//!                                   Aggregator
//!                                        │ target (rate, latency)
//!                                        ▼
//!  driver ◄──power/fw/set_rate──── reconcile ◄── deliver ◄── Runtime
//!     │                                                        ▲
//!     └────────────── signal_internal_evt ─────────────────────┘
//! ```
//!
//! ## Concurrency contract
//!
//! Everything that mutates sensor state or the request table
//! ([`request`], [`amend`], [`release`], [`deliver`], [`recycle`]) runs on
//! the manager's single cooperative execution context; the runtime's
//! `defer` is what funnels driver completions onto it. [`register`],
//! [`unregister`] and [`signal_internal_evt`] may be called from any
//! context: they touch only the lock-free registry and event pool.
//! There is no blocking anywhere; a reconcile either updates in-memory
//! state or enqueues one event and returns.
//!
//! ## Failure posture
//!
//! Driver refusals are absorbed: a refused `set_rate` leaves the state
//! machine where it was (a later completion re-reconciles), a refused
//! `power` keeps the sensor out of the requesting transition so the next
//! reconcile retries. Capacity exhaustion and infeasible rates are
//! rejected synchronously without mutating anything. No error crosses the
//! asynchronous boundary.
//!
//! [`request`]: SensorManager::request
//! [`amend`]: SensorManager::amend
//! [`release`]: SensorManager::release
//! [`deliver`]: SensorManager::deliver
//! [`recycle`]: SensorManager::recycle
//! [`register`]: SensorManager::register
//! [`unregister`]: SensorManager::unregister
//! [`signal_internal_evt`]: SensorManager::signal_internal_evt

use core::sync::atomic::{AtomicU32, Ordering};

use crate::aggregate::{calc_hw_latency, calc_hw_rate};
use crate::constants::{MAX_CLI_SENS_MATRIX_SZ, MAX_INTERNAL_EVENTS, MAX_REGISTERED_SENSORS};
use crate::driver::{DriverRef, SensorOps, TaskId};
use crate::errors::{Error, ManagerResult};
use crate::events::{EvtRecord, EvtToken, SensorEvent};
use crate::info::{SensorInfo, SensorKind};
use crate::rate::{Latency, Rate};
use crate::registry::{Handle, Registry, SlotData};
use crate::runtime::{Runtime, TaskMessage};
use crate::slab::Slab;
use crate::state::SensorState;
use crate::table::{ClientId, Request, RequestTable};

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{}};
}

/// Manager health counters.
///
/// Relaxed atomics; meant for telemetry, not for control flow.
#[derive(Debug)]
pub struct ManagerStats {
    /// Completion events accepted into the deferral queue.
    pub deferred: AtomicU32,
    /// Completion events refused by the runtime.
    pub defer_failed: AtomicU32,
    /// Allocations refused because the event pool was empty.
    pub pool_exhausted: AtomicU32,
    /// Driver dispatches that failed and were absorbed.
    pub dispatch_failed: AtomicU32,
}

impl ManagerStats {
    const fn new() -> Self {
        Self {
            deferred: AtomicU32::new(0),
            defer_failed: AtomicU32::new(0),
            pool_exhausted: AtomicU32::new(0),
            dispatch_failed: AtomicU32::new(0),
        }
    }
}

/// The sensor manager.
///
/// Generic over the event [`Runtime`] and the three pool capacities:
/// sensor slots `S`, request records `Q`, internal events `E`. The
/// defaults come from [`crate::constants`]; tests shrink them to exercise
/// exhaustion.
pub struct SensorManager<
    R: Runtime,
    const S: usize = MAX_REGISTERED_SENSORS,
    const Q: usize = MAX_CLI_SENS_MATRIX_SZ,
    const E: usize = MAX_INTERNAL_EVENTS,
> {
    registry: Registry<S>,
    requests: RequestTable<Q>,
    events: Slab<EvtRecord, E>,
    runtime: R,
    stats: ManagerStats,
}

impl<R: Runtime, const S: usize, const Q: usize, const E: usize> SensorManager<R, S, Q, E> {
    /// Create a manager with empty pools.
    pub fn new(runtime: R) -> Self {
        Self {
            registry: Registry::new(),
            requests: RequestTable::new(),
            events: Slab::new(),
            runtime,
            stats: ManagerStats::new(),
        }
    }

    /// Health counters.
    pub fn stats(&self) -> &ManagerStats {
        &self.stats
    }

    // ===== Registration =====

    /// Register an in-process driver for a sensor.
    ///
    /// The sensor starts `Off`. Callable from any context.
    pub fn register(
        &self,
        info: &'static SensorInfo,
        ops: &'static dyn SensorOps,
    ) -> ManagerResult<Handle> {
        self.registry.register(info, DriverRef::InProc(ops))
    }

    /// Register an out-of-process driver reached via `task`.
    pub fn register_task(&self, info: &'static SensorInfo, task: TaskId) -> ManagerResult<Handle> {
        self.registry.register(info, DriverRef::Task(task))
    }

    /// Retract a sensor registration.
    ///
    /// The registrant must quiesce operations on the handle first; see the
    /// registry module docs.
    pub fn unregister(&self, handle: Handle) -> ManagerResult<()> {
        self.registry.unregister(handle)
    }

    /// The `nth` live sensor of `kind`, in slot order.
    pub fn find_by_kind(
        &self,
        kind: SensorKind,
        nth: usize,
    ) -> Option<(&'static SensorInfo, Handle)> {
        self.registry.find_by_kind(kind, nth)
    }

    /// Snapshot of all live sensor handles.
    pub fn live_handles(&self) -> heapless::Vec<Handle, S> {
        self.registry.live_handles()
    }

    /// Count of live client requests across all sensors.
    pub fn active_requests(&self) -> usize {
        self.requests.len()
    }

    // ===== Client API (manager execution context) =====

    /// Subscribe `client` to `handle` at `rate`/`latency`.
    ///
    /// Rejected without side effects when the handle is unknown, the
    /// client already holds a request for this sensor, no supported rate
    /// satisfies the combined demand, or the request table is full.
    pub fn request(
        &self,
        client: ClientId,
        handle: Handle,
        rate: Rate,
        latency: Latency,
    ) -> ManagerResult<()> {
        self.registry
            .with(handle, |slot| {
                if self.requests.get(handle, client).is_some() {
                    return Err(Error::DuplicateRequest);
                }
                // Verify the rate is possible before recording anything.
                let hw_rate = calc_hw_rate(slot.info, &self.requests, handle, rate, Rate::Off)?;
                if !self.requests.add(Request {
                    handle,
                    client,
                    rate,
                    latency,
                }) {
                    return Err(Error::TableFull);
                }
                self.reconcile(slot, hw_rate, calc_hw_latency(&self.requests, handle));
                Ok(())
            })
            .unwrap_or(Err(Error::UnknownHandle))
    }

    /// Replace the client's request for this sensor with a new rate and
    /// latency.
    ///
    /// The old contribution is discounted when checking feasibility, so a
    /// client may always lower its own demand.
    pub fn amend(
        &self,
        client: ClientId,
        handle: Handle,
        new_rate: Rate,
        new_latency: Latency,
    ) -> ManagerResult<()> {
        self.registry
            .with(handle, |slot| {
                let old = self
                    .requests
                    .get(handle, client)
                    .ok_or(Error::UnknownClient)?;
                let hw_rate =
                    calc_hw_rate(slot.info, &self.requests, handle, new_rate, old.rate)?;
                if !self.requests.amend(handle, client, new_rate, new_latency) {
                    return Err(Error::UnknownClient);
                }
                self.reconcile(slot, hw_rate, calc_hw_latency(&self.requests, handle));
                Ok(())
            })
            .unwrap_or(Err(Error::UnknownHandle))
    }

    /// Drop the client's request for this sensor.
    pub fn release(&self, client: ClientId, handle: Handle) -> ManagerResult<()> {
        self.registry
            .with(handle, |slot| {
                if !self.requests.delete(handle, client) {
                    return Err(Error::UnknownClient);
                }
                self.resync(slot, handle);
                Ok(())
            })
            .unwrap_or(Err(Error::UnknownHandle))
    }

    /// Ask the driver for one sample on behalf of an on-demand subscriber.
    ///
    /// The client must hold a request for this sensor.
    pub fn trigger_ondemand(&self, client: ClientId, handle: Handle) -> ManagerResult<()> {
        self.registry
            .with(handle, |slot| {
                if self.requests.get(handle, client).is_none() {
                    return Err(Error::UnknownClient);
                }
                if self.call_trigger(slot) {
                    Ok(())
                } else {
                    Err(Error::DriverRejected)
                }
            })
            .unwrap_or(Err(Error::UnknownHandle))
    }

    /// Flush batched samples toward the clients. No client check: flushing
    /// is idempotent and harmless.
    pub fn flush(&self, handle: Handle) -> ManagerResult<()> {
        self.registry
            .with(handle, |slot| {
                if self.call_flush(slot) {
                    Ok(())
                } else {
                    Err(Error::DriverRejected)
                }
            })
            .unwrap_or(Err(Error::UnknownHandle))
    }

    /// Snapshot of the sensor's state-machine position. Unknown handles
    /// read as `Off`.
    pub fn current_state(&self, handle: Handle) -> SensorState {
        self.registry
            .with(handle, |slot| slot.state.get())
            .unwrap_or(SensorState::Off)
    }

    /// Snapshot of the sensor's batching latency; `INVALID` outside
    /// `Active` and for unknown handles.
    pub fn current_latency(&self, handle: Handle) -> Latency {
        self.registry
            .with(handle, |slot| slot.state.get().latency())
            .unwrap_or(Latency::INVALID)
    }

    // ===== Driver-side entry points =====

    /// Report a completion for `handle`.
    ///
    /// Allocates an internal event record and defers it onto the manager's
    /// execution context. Callable from any context. Fails when the pool
    /// is exhausted or the runtime refuses the deferral; the driver should
    /// re-signal current state when it can.
    pub fn signal_internal_evt(&self, handle: Handle, event: SensorEvent) -> ManagerResult<()> {
        let Some(index) = self.events.insert(EvtRecord::Completion { handle, event }) else {
            self.stats.pool_exhausted.fetch_add(1, Ordering::Relaxed);
            log_warn!("internal event pool exhausted; completion dropped");
            return Err(Error::EventPoolFull);
        };

        if self.runtime.defer(EvtToken::new(index)) {
            self.stats.deferred.fetch_add(1, Ordering::Relaxed);
            Ok(())
        } else {
            self.events.free(index);
            self.stats.defer_failed.fetch_add(1, Ordering::Relaxed);
            Err(Error::DeferRejected)
        }
    }

    /// Deliver a deferred completion. Called by the runtime on the
    /// manager's execution context, once per deferred token.
    pub fn deliver(&self, evt: EvtToken) {
        let index = evt.index();
        let Some(record) = self.events.get(index) else {
            return;
        };

        if let EvtRecord::Completion { handle, event } = record {
            match event {
                SensorEvent::PowerStateChanged { on } => self.on_power_state_changed(handle, on),
                SensorEvent::FwStateChanged { result } => self.on_fw_state_changed(handle, result),
                SensorEvent::RateChanged { rate, latency } => {
                    self.on_rate_changed(handle, rate, latency)
                }
            }
        }

        // Freed after the handler so a handler-triggered dispatch sees the
        // same pool pressure the completion created.
        self.events.free(index);
    }

    /// Return a consumed out-of-process set-rate payload to the pool.
    pub fn recycle(&self, token: EvtToken) {
        self.events.free(token.index());
    }

    // ===== State machine =====

    /// Compare current state to the aggregated target and issue at most
    /// one driver operation to close the gap.
    fn reconcile(&self, slot: &SlotData, target_rate: Rate, target_latency: Latency) {
        match slot.state.get() {
            // Already there.
            SensorState::Active { rate, latency }
                if rate == target_rate && latency == target_latency => {}
            SensorState::Off if target_rate.is_off() && !target_latency.is_valid() => {}

            SensorState::Off => {
                if self.call_power(slot, true) {
                    slot.state.set(SensorState::PoweringOn);
                } else {
                    self.stats.dispatch_failed.fetch_add(1, Ordering::Relaxed);
                }
            }

            // Short-circuit: the outstanding power-off completion will see
            // this state and re-issue power(on) itself.
            SensorState::PoweringOff => {
                slot.state.set(SensorState::PoweringOn);
            }

            // A transition is in flight; its completion re-reconciles.
            SensorState::PoweringOn | SensorState::FwUploading => {}

            SensorState::Active { .. } => {
                if target_rate.is_workload() || target_latency.is_valid() {
                    // Plain rate change. Immediate failure is absorbed;
                    // the next reconcile retries.
                    if !self.call_set_rate(slot, target_rate, target_latency) {
                        self.stats.dispatch_failed.fetch_add(1, Ordering::Relaxed);
                    }
                } else if self.call_power(slot, false) {
                    slot.state.set(SensorState::PoweringOff);
                } else {
                    self.stats.dispatch_failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Recompute the target from the live request set and reconcile.
    ///
    /// Shrinking a feasible request set keeps it feasible, so the rate
    /// calculation cannot fail here; a failure would mean the table was
    /// corrupted, and skipping the reconcile is the safe response.
    fn resync(&self, slot: &SlotData, handle: Handle) {
        if let Ok(target) = calc_hw_rate(slot.info, &self.requests, handle, Rate::Off, Rate::Off) {
            self.reconcile(slot, target, calc_hw_latency(&self.requests, handle));
        }
    }

    // ===== Completion handlers =====

    fn on_power_state_changed(&self, handle: Handle, on: bool) {
        self.registry.with(handle, |slot| {
            match (slot.state.get(), on) {
                // Powered up: push firmware.
                (SensorState::PoweringOn, true) => {
                    slot.state.set(SensorState::FwUploading);
                    if !self.call_fw_upload(slot) {
                        self.stats.dispatch_failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                // Powered down as requested.
                (SensorState::PoweringOff, false) => {
                    slot.state.set(SensorState::Off);
                }
                // Spurious off while coming up, or the power-off
                // completion of a flipped transition: ask again.
                (SensorState::PoweringOn, false) => {
                    let _ = self.call_power(slot, true);
                }
                // Spurious on while shutting down: ask again.
                (SensorState::PoweringOff, true) => {
                    let _ = self.call_power(slot, false);
                }
                // Late or duplicate event.
                _ => {}
            }
        });
    }

    fn on_fw_state_changed(&self, handle: Handle, result: Option<(Rate, Latency)>) {
        self.registry.with(handle, |slot| match result {
            // Upload failed: give up on this boot attempt.
            None => {
                slot.state.set(SensorState::PoweringOff);
                let _ = self.call_power(slot, false);
            }
            Some((rate, latency)) => match slot.state.get() {
                // We're up. A rate change may have been requested during
                // the upload, so reconcile against a fresh target.
                SensorState::FwUploading => {
                    slot.state.set(SensorState::Active { rate, latency });
                    self.resync(slot, handle);
                }
                // The target flipped while firmware was uploading.
                SensorState::PoweringOff => {
                    let _ = self.call_power(slot, false);
                }
                _ => {}
            },
        });
    }

    fn on_rate_changed(&self, handle: Handle, rate: Rate, latency: Latency) {
        self.registry.with(handle, |slot| {
            slot.state.set(match rate {
                // A driver reporting rate zero has stopped sampling.
                Rate::Off => SensorState::Off,
                rate => SensorState::Active { rate, latency },
            });
        });
    }

    // ===== Dispatch =====

    fn call_power(&self, slot: &SlotData, on: bool) -> bool {
        match slot.driver {
            DriverRef::InProc(ops) => ops.power(on),
            DriverRef::Task(task) => self.runtime.post(task, TaskMessage::Power { on }),
        }
    }

    fn call_fw_upload(&self, slot: &SlotData) -> bool {
        match slot.driver {
            DriverRef::InProc(ops) => ops.firmware_upload(),
            DriverRef::Task(task) => self.runtime.post(task, TaskMessage::FirmwareUpload),
        }
    }

    fn call_set_rate(&self, slot: &SlotData, rate: Rate, latency: Latency) -> bool {
        match slot.driver {
            DriverRef::InProc(ops) => ops.set_rate(rate, latency),
            DriverRef::Task(task) => {
                // The payload shares the internal event pool so external
                // dispatch is bounded by the same budget as completions.
                let Some(index) = self.events.insert(EvtRecord::SetRate { rate, latency }) else {
                    self.stats.pool_exhausted.fetch_add(1, Ordering::Relaxed);
                    log_warn!("event pool exhausted; set-rate dispatch deferred to next reconcile");
                    return false;
                };
                let msg = TaskMessage::SetRate {
                    rate,
                    latency,
                    token: EvtToken::new(index),
                };
                if self.runtime.post(task, msg) {
                    true
                } else {
                    self.events.free(index);
                    false
                }
            }
        }
    }

    fn call_flush(&self, slot: &SlotData) -> bool {
        match slot.driver {
            DriverRef::InProc(ops) => ops.flush(),
            DriverRef::Task(task) => self.runtime.post(task, TaskMessage::Flush),
        }
    }

    fn call_trigger(&self, slot: &SlotData) -> bool {
        match slot.driver {
            DriverRef::InProc(ops) => ops.trigger_ondemand(),
            DriverRef::Task(task) => self.runtime.post(task, TaskMessage::Trigger),
        }
    }
}
