//! Capacity Constants for the Sensor Manager
//!
//! All memory in the manager is planned at compile time: the sensor slot
//! array, the client request table, and the internal event pool are fixed
//! pools sized by the constants below. The [`SensorManager`] takes these as
//! const-generic defaults, so a hub build can override any of them without
//! touching this module (and tests instantiate tiny pools to exercise the
//! exhaustion paths).
//!
//! ## Sizing Guidelines
//!
//! 1. `MAX_CLI_SENS_MATRIX_SZ` must accommodate every concurrent
//!    `(client, sensor)` subscription pair. Size it as
//!    `max_clients * max_simultaneously_used_sensors`, not the full
//!    cartesian product, unless RAM is plentiful.
//! 2. `MAX_INTERNAL_EVENTS` is shared between driver completion events and
//!    set-rate payloads dispatched to out-of-process drivers. Undersizing
//!    it does not lose state (set-rate dispatches fail and are retried on
//!    the next reconcile), but it does add latency under load.
//!
//! [`SensorManager`]: crate::manager::SensorManager

/// Maximum number of simultaneously registered sensors.
///
/// One registry slot per sensor; a slot is roughly 40 bytes on a 32-bit
/// target. Raising this only costs RAM and slightly longer handle scans
/// (lookups are linear).
pub const MAX_REGISTERED_SENSORS: usize = 32;

/// Capacity of the client request table.
///
/// Upper bound on live `(client, sensor)` subscription pairs across the
/// whole hub. A request record is 24 bytes; the default allows 64 pairs,
/// e.g. 8 clients each holding requests on 8 sensors.
pub const MAX_CLI_SENS_MATRIX_SZ: usize = 64;

/// Capacity of the internal event pool.
///
/// Shared between deferred driver completion events and set-rate payloads
/// addressed to out-of-process drivers. Events are consumed on the next
/// turn of the manager's execution context, so the pool only fills when
/// completions burst faster than the context drains them.
pub const MAX_INTERNAL_EVENTS: usize = 32;
