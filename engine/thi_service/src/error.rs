use thi_model::ArtifactError;
use thi_schema::SchemaError;
use thiserror::Error;

/// Why the service has no model to serve from.
#[derive(Debug, Error)]
pub enum UnavailableReason {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("no inference service has been installed")]
    NotInstalled,
}

/// Errors surfaced to callers of the inference service.
///
/// The two kinds are kept apart so that a bad request can be told from a
/// broken deployment.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The feature map was rejected; the model was not consulted.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] SchemaError),
    /// No usable model is loaded.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] UnavailableReason),
}

impl From<ArtifactError> for ServiceError {
    fn from(e: ArtifactError) -> Self {
        ServiceError::ModelUnavailable(UnavailableReason::Artifact(e))
    }
}

impl ServiceError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ServiceError::InvalidInput(_))
    }

    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, ServiceError::ModelUnavailable(_))
    }
}
