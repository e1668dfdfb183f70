//! Sensor feature schema for the Train Health Index (THI).
//!
//! The schema fixes the order, wire names, units and sampling ranges of the
//! eight readings every other stage of the pipeline works with. Training and
//! inference both go through [`FeatureVector`], so the column order can never
//! drift between the two.

pub mod error;
pub mod feature;
pub mod vector;

pub use error::SchemaError;
pub use feature::{Feature, FeatureRange, FEATURE_COUNT};
pub use vector::{FeatureMap, FeatureVector, MAX_READING_MAGNITUDE};

/// Version of the feature layout. Bumped whenever features are added,
/// removed, renamed or reordered; persisted models record it.
pub const SCHEMA_VERSION: u32 = 1;
