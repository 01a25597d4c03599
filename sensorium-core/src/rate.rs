//! Rate and Latency Value Types
//!
//! ## Overview
//!
//! Clients ask for a sensor in terms of a sampling [`Rate`] and a batching
//! [`Latency`]. Both carry "no value" cases that older hub firmwares
//! encoded as in-band sentinel integers; here they are explicit:
//!
//! - `Rate::Off` is the absence of a request, never a hardware rate.
//! - `Rate::OnDemand` and `Rate::OnChange` are pseudo-rates: the sensor
//!   must be powered but samples only when triggered (on-demand) or when
//!   the measured value moves (on-change). Any sensor can serve an
//!   on-demand subscriber; on-change capability is the driver's problem by
//!   the time a request reaches the manager.
//! - `Latency::INVALID` means "not batching / no meaningful value".
//!
//! The manager-internal transition states (powering on, uploading
//! firmware, ...) are deliberately **not** representable here; they live
//! in [`SensorState`](crate::state::SensorState), so a transition marker
//! can never leak into a driver call.
//!
//! ## Units
//!
//! Continuous rates are in device rate units: samples per second scaled by
//! 1024 (Q10 fixed point), which lets slow environmental sensors express
//! sub-hertz sampling without floats. [`rate_units_from_hz`] converts for
//! the common case. Latency is in nanoseconds.

/// Requested or reported sampling rate.
///
/// Ordinary continuous rates are positive values in device rate units (see
/// module docs). The three unit variants classify a request rather than
/// quantify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rate {
    /// No request / sensor not sampling.
    Off,
    /// Powered, sampling only when explicitly triggered.
    OnDemand,
    /// Powered, reporting only when the measured value changes.
    OnChange,
    /// Continuous sampling at the given rate in device rate units.
    Continuous(u32),
}

impl Rate {
    /// True for `Off`.
    pub const fn is_off(self) -> bool {
        matches!(self, Rate::Off)
    }

    /// True for any variant that requires the sensor to be powered.
    pub const fn is_workload(self) -> bool {
        !self.is_off()
    }

    /// The continuous rate in device units, if this is a continuous rate.
    pub const fn units(self) -> Option<u32> {
        match self {
            Rate::Continuous(u) => Some(u),
            _ => None,
        }
    }
}

/// Convert whole hertz to device rate units (Q10 fixed point).
///
/// Saturates rather than wrapping for absurd inputs; real sensors top out
/// far below the 4 MHz equivalent where saturation starts.
pub const fn rate_units_from_hz(hz: u32) -> u32 {
    match hz.checked_mul(1 << 10) {
        Some(u) => u,
        None => u32::MAX,
    }
}

/// Maximum batching delay in nanoseconds.
///
/// Smaller is stricter: a client asking for 10 ms latency forces delivery
/// at least that often regardless of what other clients tolerate.
/// [`Latency::INVALID`] (all bits set) means unspecified / not batching
/// and compares greater than every real latency, so aggregation by
/// minimum needs no special casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Latency(u64);

impl Latency {
    /// "Not batching / no meaningful value" marker.
    pub const INVALID: Latency = Latency(u64::MAX);

    /// Latency from a nanosecond count.
    ///
    /// `u64::MAX` nanoseconds reads as [`INVALID`]; it is ~584 years of
    /// batching delay.
    ///
    /// [`INVALID`]: Latency::INVALID
    pub const fn from_nanos(ns: u64) -> Self {
        Latency(ns)
    }

    /// Latency from a millisecond count.
    pub const fn from_millis(ms: u64) -> Self {
        Latency(ms * 1_000_000)
    }

    /// Raw nanosecond count.
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// True unless this is the [`INVALID`](Latency::INVALID) marker.
    pub const fn is_valid(self) -> bool {
        self.0 != u64::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_classification() {
        assert!(!Rate::Off.is_workload());
        assert!(Rate::OnDemand.is_workload());
        assert!(Rate::OnChange.is_workload());
        assert!(Rate::Continuous(100).is_workload());
    }

    #[test]
    fn latency_ordering_puts_invalid_last() {
        assert!(Latency::from_millis(10) < Latency::from_millis(20));
        assert!(Latency::from_nanos(u64::MAX - 1) < Latency::INVALID);
        assert!(!Latency::INVALID.is_valid());
        assert!(Latency::from_millis(0).is_valid());
    }

    #[test]
    fn hz_conversion_is_q10() {
        assert_eq!(rate_units_from_hz(1), 1024);
        assert_eq!(rate_units_from_hz(100), 102_400);
        assert_eq!(rate_units_from_hz(u32::MAX), u32::MAX);
    }
}
