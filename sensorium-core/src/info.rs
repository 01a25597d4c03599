//! Sensor Descriptors
//!
//! A driver registers each sensor with an immutable [`SensorInfo`]
//! describing what the hardware is and which discrete rates it can run at.
//! The descriptor is owned by the registrant for the life of the
//! registration (`&'static` in practice; driver descriptors are const
//! data), so the manager never copies or frees it.

/// Sensor class, used for lookup by type.
///
/// Maps to the hub's wire-level sensor type tags. `Custom` covers
/// board-specific hardware without forking the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorKind {
    Accelerometer = 0,
    Gyroscope = 1,
    Magnetometer = 2,
    Barometer = 3,
    AmbientTemperature = 4,
    Proximity = 5,
    AmbientLight = 6,
    HallEffect = 7,
    StepDetector = 8,
    SignificantMotion = 9,
    Custom(u8),
}

impl SensorKind {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Magnetometer => "magnetometer",
            SensorKind::Barometer => "barometer",
            SensorKind::AmbientTemperature => "ambient_temperature",
            SensorKind::Proximity => "proximity",
            SensorKind::AmbientLight => "ambient_light",
            SensorKind::HallEffect => "hall_effect",
            SensorKind::StepDetector => "step_detector",
            SensorKind::SignificantMotion => "significant_motion",
            SensorKind::Custom(_) => "custom",
        }
    }
}

/// Immutable descriptor for one registered sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorInfo {
    /// Short diagnostic name, e.g. `"bmi160-accel"`.
    pub name: &'static str,
    /// Sensor class for lookup by type.
    pub kind: SensorKind,
    /// Discrete hardware rates this sensor supports, in device rate units,
    /// ascending. Empty means the sensor only serves on-demand/on-change
    /// subscribers.
    pub supported_rates: &'static [u32],
}

impl SensorInfo {
    /// Smallest supported rate that is at least `rate_units`, if any.
    ///
    /// Relies on `supported_rates` being ascending: the first satisfying
    /// entry is the minimal one.
    pub fn smallest_rate_at_least(&self, rate_units: u32) -> Option<u32> {
        self.supported_rates.iter().copied().find(|&r| r >= rate_units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INFO: SensorInfo = SensorInfo {
        name: "test-accel",
        kind: SensorKind::Accelerometer,
        supported_rates: &[10, 50, 100],
    };

    #[test]
    fn smallest_rate_picks_first_satisfying() {
        assert_eq!(INFO.smallest_rate_at_least(10), Some(10));
        assert_eq!(INFO.smallest_rate_at_least(11), Some(50));
        assert_eq!(INFO.smallest_rate_at_least(100), Some(100));
        assert_eq!(INFO.smallest_rate_at_least(101), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(SensorKind::Barometer.name(), "barometer");
        assert_eq!(SensorKind::Custom(7).name(), "custom");
    }
}
