//! The eight monitored sensor dimensions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of readings in a feature vector.
pub const FEATURE_COUNT: usize = 8;

/// Closed interval of plausible values for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// A monitored sensor dimension, declared in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Vibration,
    Temperature,
    AxleLoad,
    BrakePressure,
    Speed,
    Voltage,
    Current,
    Noise,
}

impl Feature {
    /// All features in schema order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Vibration,
        Feature::Temperature,
        Feature::AxleLoad,
        Feature::BrakePressure,
        Feature::Speed,
        Feature::Voltage,
        Feature::Current,
        Feature::Noise,
    ];

    /// Column position of this feature in a [`crate::FeatureVector`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Key used in feature maps and persisted artifacts.
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Vibration => "vibration",
            Feature::Temperature => "temperature",
            Feature::AxleLoad => "axle_load",
            Feature::BrakePressure => "brake_pressure",
            Feature::Speed => "speed",
            Feature::Voltage => "voltage",
            Feature::Current => "current",
            Feature::Noise => "noise",
        }
    }

    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Feature::Vibration => "Vibration level",
            Feature::Temperature => "Temperature",
            Feature::AxleLoad => "Axle load",
            Feature::BrakePressure => "Brake pressure",
            Feature::Speed => "Speed",
            Feature::Voltage => "Voltage",
            Feature::Current => "Current",
            Feature::Noise => "Acoustic noise",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Feature::Vibration => "mm/s",
            Feature::Temperature => "°C",
            Feature::AxleLoad => "t",
            Feature::BrakePressure => "bar",
            Feature::Speed => "km/h",
            Feature::Voltage => "V",
            Feature::Current => "A",
            Feature::Noise => "dB",
        }
    }

    /// Documented sampling range.
    pub const fn range(self) -> FeatureRange {
        match self {
            Feature::Vibration => FeatureRange::new(0.1, 5.0),
            Feature::Temperature => FeatureRange::new(30.0, 120.0),
            Feature::AxleLoad => FeatureRange::new(10.0, 25.0),
            Feature::BrakePressure => FeatureRange::new(4.0, 8.0),
            Feature::Speed => FeatureRange::new(30.0, 130.0),
            Feature::Voltage => FeatureRange::new(600.0, 800.0),
            Feature::Current => FeatureRange::new(50.0, 150.0),
            Feature::Noise => FeatureRange::new(40.0, 100.0),
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Wire names in schema order.
    pub fn names() -> [&'static str; FEATURE_COUNT] {
        Feature::ALL.map(Feature::name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_declaration_order() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("humidity"), None);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Feature::BrakePressure).unwrap();
        assert_eq!(json, "\"brake_pressure\"");
    }

    #[test]
    fn ranges_are_well_formed() {
        for feature in Feature::ALL {
            let r = feature.range();
            assert!(r.min < r.max, "{feature} range is empty");
            assert!(r.contains(r.midpoint()));
        }
    }
}
