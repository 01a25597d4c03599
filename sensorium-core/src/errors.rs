//! Error types for manager operations
//!
//! Keep errors small - they're returned from hot control paths and on
//! embedded targets they may cross a defmt transport. Every fallible
//! manager operation reports a synchronous disposition only; no error is
//! ever propagated across the asynchronous driver boundary.

use thiserror_no_std::Error;

/// Result type for manager operations
pub type ManagerResult<T> = Result<T, Error>;

/// Manager errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// All sensor registry slots are in use
    #[error("sensor registry full")]
    RegistryFull,

    /// The client request table is at capacity
    #[error("client request table full")]
    TableFull,

    /// The internal event pool is exhausted
    #[error("internal event pool exhausted")]
    EventPoolFull,

    /// No registered sensor matches the handle
    #[error("unknown sensor handle")]
    UnknownHandle,

    /// The client holds no request for this sensor
    #[error("client has no request for this sensor")]
    UnknownClient,

    /// The client already holds a live request for this sensor
    #[error("client already subscribed to this sensor")]
    DuplicateRequest,

    /// No supported hardware rate satisfies the aggregate demand
    #[error("no supported rate satisfies the aggregate demand")]
    RateInfeasible,

    /// The event runtime refused to defer the event
    #[error("event runtime rejected deferral")]
    DeferRejected,

    /// The driver refused the operation
    #[error("driver rejected the operation")]
    DriverRejected,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::RegistryFull => defmt::write!(fmt, "registry full"),
            Self::TableFull => defmt::write!(fmt, "request table full"),
            Self::EventPoolFull => defmt::write!(fmt, "event pool exhausted"),
            Self::UnknownHandle => defmt::write!(fmt, "unknown handle"),
            Self::UnknownClient => defmt::write!(fmt, "unknown client"),
            Self::DuplicateRequest => defmt::write!(fmt, "duplicate request"),
            Self::RateInfeasible => defmt::write!(fmt, "rate infeasible"),
            Self::DeferRejected => defmt::write!(fmt, "defer rejected"),
            Self::DriverRejected => defmt::write!(fmt, "driver rejected"),
        }
    }
}
