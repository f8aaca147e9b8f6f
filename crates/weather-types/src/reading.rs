//! The numeric readings carried by an observation.

use crate::observation::ObservationEvent;

/// A numeric reading tracked by the aggregation engine.
///
/// Temperature and humidity are aggregated independently but by the same
/// rules, so most update paths are written once over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reading {
    /// Temperature in whole degrees.
    Temperature,
    /// Percentage-like humidity.
    Humidity,
}

impl Reading {
    /// Both readings, in update order.
    pub const ALL: [Self; 2] = [Self::Temperature, Self::Humidity];

    /// Key segment used for this reading.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        }
    }

    /// Extract this reading's value from an observation.
    pub fn of(self, event: &ObservationEvent) -> i64 {
        match self {
            Self::Temperature => i64::from(event.temperature),
            Self::Humidity => i64::from(event.humidity),
        }
    }
}

impl core::fmt::Display for Reading {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
