//! Per-Sensor Runtime State
//!
//! The manager drives every sensor through a small power/firmware/rate
//! state machine:
//!
//! ```text
//!            workload appears          power-on event
//!   Off ───────────────────► PoweringOn ───────────► FwUploading
//!    ▲                          ▲    │                    │
//!    │ power-off event          │    │ spurious off:      │ firmware done
//!    │                          │    │ re-issue power(on) │ (rate, latency)
//!    │                 flip     │    ▼                    ▼
//!   PoweringOff ◄──────────────────────────────────── Active{rate, latency}
//!                no workload remains: power(off)
//! ```
//!
//! The "flip" edge is the short-circuit: a workload appearing while the
//! sensor is still powering off rewrites the state to `PoweringOn` without
//! issuing a power call; the outstanding power-off completion notices and
//! re-issues `power(on)` itself.
//!
//! Outside `Active`, the latency is pinned to
//! [`Latency::INVALID`](crate::rate::Latency::INVALID); transition states
//! carry no meaningful batching configuration, which the representation
//! makes unspellable rather than merely discouraged.

use crate::rate::{Latency, Rate};

/// Runtime state of one registered sensor.
///
/// Only the state machine (driven by client requests and driver
/// completion events) writes this; registration seeds it to `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    /// Powered down.
    Off,
    /// Power-on requested, completion not yet seen.
    PoweringOn,
    /// Powered, firmware upload in flight.
    FwUploading,
    /// Power-off requested, completion not yet seen.
    PoweringOff,
    /// Running at the given hardware rate and batching latency.
    Active {
        /// Rate the hardware is currently honoring.
        rate: Rate,
        /// Batching latency the hardware is currently honoring.
        latency: Latency,
    },
}

impl SensorState {
    /// The batching latency, `INVALID` outside `Active`.
    pub const fn latency(self) -> Latency {
        match self {
            SensorState::Active { latency, .. } => latency,
            _ => Latency::INVALID,
        }
    }

    /// The running rate, if the sensor is active.
    pub const fn rate(self) -> Option<Rate> {
        match self {
            SensorState::Active { rate, .. } => Some(rate),
            _ => None,
        }
    }

    /// True while a power or firmware transition is outstanding.
    pub const fn is_transitional(self) -> bool {
        matches!(
            self,
            SensorState::PoweringOn | SensorState::PoweringOff | SensorState::FwUploading
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_only_meaningful_when_active() {
        assert_eq!(SensorState::Off.latency(), Latency::INVALID);
        assert_eq!(SensorState::PoweringOn.latency(), Latency::INVALID);
        let active = SensorState::Active {
            rate: Rate::Continuous(100),
            latency: Latency::from_millis(5),
        };
        assert_eq!(active.latency(), Latency::from_millis(5));
        assert_eq!(active.rate(), Some(Rate::Continuous(100)));
    }

    #[test]
    fn transitional_states() {
        assert!(SensorState::PoweringOn.is_transitional());
        assert!(SensorState::PoweringOff.is_transitional());
        assert!(SensorState::FwUploading.is_transitional());
        assert!(!SensorState::Off.is_transitional());
    }
}
