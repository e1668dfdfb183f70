//! Nearest-neighbor approximation of the Train Health Index rule.
//!
//! The offline pipeline lives here: split a labeled corpus, fit a
//! [`KnnRegressor`], score it on the held-out rows and persist the result as
//! a versioned [`ModelArtifact`]. The serving side only ever calls
//! [`TrainedModel::load`].

pub mod artifact;
pub mod error;
pub mod knn;
pub mod metrics;
pub mod split;
pub mod trainer;

pub use artifact::{ModelArtifact, TrainedModel, TrainingMetadata, ARTIFACT_FORMAT};
pub use error::{ArtifactError, FitError, SplitError, TrainError};
pub use knn::{KnnRegressor, Neighbor, Weighting};
pub use metrics::HoldoutMetrics;
pub use split::{train_test_split, Split};
pub use trainer::{run, train, train_to_path, TrainerConfig};
