//! Error types for fitting, splitting, persisting and training.

use std::path::PathBuf;

use thi_label::SynthError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("neighbor count must be at least 1")]
    ZeroNeighbors,
    #[error("{samples} training rows cannot support k = {k}")]
    TooFewSamples { k: usize, samples: usize },
    #[error("{features} feature rows but {targets} targets")]
    LengthMismatch { features: usize, targets: usize },
    #[error("training row {0} contains a non-finite value")]
    NonFinite(usize),
    #[error("training row {0} holds a reading beyond the measurable scale")]
    OutOfScale(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidFraction(f64),
    #[error("splitting {len} rows leaves {train} for training and {test} held out")]
    Degenerate { len: usize, train: usize, test: usize },
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model artifact: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unrecognised artifact format `{0}`")]
    UnknownFormat(String),
    #[error("artifact schema version {found} is not supported (expected {expected})")]
    IncompatibleSchema { found: u32, expected: u32 },
    #[error("artifact feature layout {found:?} does not match the schema")]
    FeatureMismatch { found: Vec<String> },
    #[error("artifact holds an invalid model: {0}")]
    Invalid(#[from] FitError),
}

impl ArtifactError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Failures of the offline training job. None of them leaves an artifact
/// behind.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Synth(#[from] SynthError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
