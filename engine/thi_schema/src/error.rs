//! Errors raised while turning loosely typed input into a [`crate::FeatureVector`].

use thiserror::Error;

/// Reasons a feature map or slice cannot be interpreted as a feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The input is not a name-keyed object.
    #[error("expected an object of feature readings, got {0}")]
    NotAnObject(String),
    /// A required reading is absent.
    #[error("missing feature `{0}`")]
    MissingField(&'static str),
    /// The input names a reading the schema does not know.
    #[error("unknown feature `{0}`")]
    UnknownField(String),
    /// A positional input has the wrong number of readings.
    #[error("expected {expected} features, got {actual}")]
    Arity {
        /// Number of readings the schema defines.
        expected: usize,
        /// Number of readings supplied.
        actual: usize,
    },
    /// A reading cannot be coerced to a real number.
    #[error("feature `{field}` is not numeric: {value}")]
    NotNumeric {
        /// Wire name of the offending reading.
        field: &'static str,
        /// The raw value, rendered as JSON.
        value: String,
    },
    /// A reading parsed to NaN or infinity.
    #[error("feature `{0}` is not a finite number")]
    NonFinite(&'static str),
    /// A reading is finite but too large in magnitude to be compared with
    /// the training data.
    #[error("feature `{field}` is out of scale: {value}")]
    OutOfScale {
        /// Wire name of the offending reading.
        field: &'static str,
        /// The parsed value.
        value: f64,
    },
}
