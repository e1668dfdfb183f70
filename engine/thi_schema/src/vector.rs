//! Ordered feature vectors and conversion from loosely typed feature maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::SchemaError;
use crate::feature::{Feature, FEATURE_COUNT};

/// Name-keyed readings as they arrive from a caller (for example a decoded
/// JSON request body).
pub type FeatureMap = Map<String, JsonValue>;

/// Largest reading magnitude accepted from callers.
///
/// Below it, f64 still resolves sub-millimetre differences between a reading
/// and the training rows, and squared distances stay far from overflow.
pub const MAX_READING_MAGNITUDE: f64 = 1e12;

/// Eight readings in schema order.
///
/// Serialized as a plain array so persisted training partitions stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub const fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Vector holding the midpoint of every documented range.
    pub fn midpoint() -> Self {
        Self(Feature::ALL.map(|f| f.range().midpoint()))
    }

    pub fn from_slice(values: &[f64]) -> Result<Self, SchemaError> {
        let arr: [f64; FEATURE_COUNT] =
            values.try_into().map_err(|_| SchemaError::Arity {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self(arr))
    }

    /// Parse a name-keyed map.
    ///
    /// Every schema feature must be present exactly once and no other keys
    /// are accepted. Values may be JSON numbers or strings holding a number;
    /// the result must be finite and no larger than
    /// [`MAX_READING_MAGNITUDE`] in magnitude.
    pub fn from_map(map: &FeatureMap) -> Result<Self, SchemaError> {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let raw = map
                .get(feature.name())
                .ok_or(SchemaError::MissingField(feature.name()))?;
            values[feature.index()] = coerce(feature, raw)?;
        }
        if map.len() != FEATURE_COUNT {
            if let Some(unknown) = map.keys().find(|k| Feature::from_name(k).is_none()) {
                return Err(SchemaError::UnknownField(unknown.clone()));
            }
        }
        Ok(Self(values))
    }

    /// Parse an arbitrary JSON value, which must be an object.
    pub fn from_json(value: &JsonValue) -> Result<Self, SchemaError> {
        match value {
            JsonValue::Object(map) => Self::from_map(map),
            other => Err(SchemaError::NotAnObject(json_kind(other).to_string())),
        }
    }

    /// Name-keyed representation, the inverse of [`FeatureVector::from_map`].
    pub fn to_map(&self) -> FeatureMap {
        Feature::ALL
            .iter()
            .map(|f| (f.name().to_string(), JsonValue::from(self.get(*f))))
            .collect()
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Copy of this vector with one reading replaced.
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.0[feature.index()] = value;
        self
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().zip(self.0.iter().copied())
    }

    /// Features whose reading lies outside the documented range.
    pub fn out_of_range(&self) -> Vec<Feature> {
        self.iter()
            .filter(|(f, v)| !f.range().contains(*v))
            .map(|(f, _)| f)
            .collect()
    }

    /// Euclidean distance on raw units.
    ///
    /// Components are scaled by the largest difference before squaring, so
    /// the result is finite whenever every difference is.
    pub fn distance(&self, other: &FeatureVector) -> f64 {
        let diffs = self.0.iter().zip(other.0.iter()).map(|(a, b)| (a - b).abs());
        let scale = diffs.clone().fold(0.0, f64::max);
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }
        let sum: f64 = diffs.map(|d| (d / scale) * (d / scale)).sum();
        scale * sum.sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Every reading is finite and within [`MAX_READING_MAGNITUDE`].
    pub fn is_within_scale(&self) -> bool {
        self.0
            .iter()
            .all(|v| v.is_finite() && v.abs() <= MAX_READING_MAGNITUDE)
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn coerce(feature: Feature, raw: &JsonValue) -> Result<f64, SchemaError> {
    let not_numeric = || SchemaError::NotNumeric {
        field: feature.name(),
        value: raw.to_string(),
    };
    let value = match raw {
        JsonValue::Number(n) => n.as_f64().ok_or_else(not_numeric)?,
        JsonValue::String(s) => s.trim().parse::<f64>().map_err(|_| not_numeric())?,
        _ => return Err(not_numeric()),
    };
    if !value.is_finite() {
        return Err(SchemaError::NonFinite(feature.name()));
    }
    if value.abs() > MAX_READING_MAGNITUDE {
        return Err(SchemaError::OutOfScale {
            field: feature.name(),
            value,
        });
    }
    Ok(value)
}
