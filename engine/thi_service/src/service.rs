//! The `score(features)` operation.

use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thi_model::{KnnRegressor, TrainedModel, TrainingMetadata};
use thi_schema::{FeatureMap, FeatureVector};

use crate::error::ServiceError;
use crate::recommendation::Recommendation;

/// Result of scoring one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Predicted health index, rounded to two decimals.
    pub thi: f64,
    pub suggestion: Recommendation,
}

/// Round a raw prediction to two decimals for presentation.
pub fn round_thi(raw: f64) -> f64 {
    (raw * 100.0).round() / 100.0
}

/// Read-only inference over a trained model.
///
/// Clones share the same model.
#[derive(Debug, Clone)]
pub struct HealthIndexService {
    model: Arc<KnnRegressor>,
    metadata: Option<Arc<TrainingMetadata>>,
}

impl HealthIndexService {
    /// Load an artifact from disk. Any problem with the file is reported as
    /// [`ServiceError::ModelUnavailable`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let trained = TrainedModel::load(path)?;
        Ok(Self::from_trained(trained))
    }

    pub fn from_trained(trained: TrainedModel) -> Self {
        Self {
            model: Arc::new(trained.model),
            metadata: Some(Arc::new(trained.metadata)),
        }
    }

    pub fn from_model(model: KnnRegressor) -> Self {
        Self {
            model: Arc::new(model),
            metadata: None,
        }
    }

    pub fn model(&self) -> &KnnRegressor {
        &self.model
    }

    /// Training metadata, when the model came from an artifact.
    pub fn metadata(&self) -> Option<&TrainingMetadata> {
        self.metadata.as_deref()
    }

    /// Validate a name-keyed feature map and score it.
    pub fn score(&self, features: &FeatureMap) -> Result<Assessment, ServiceError> {
        let vector = FeatureVector::from_map(features)?;
        Ok(self.score_vector(&vector))
    }

    /// Like [`HealthIndexService::score`] for an arbitrary JSON value.
    pub fn score_json(&self, value: &JsonValue) -> Result<Assessment, ServiceError> {
        let vector = FeatureVector::from_json(value)?;
        Ok(self.score_vector(&vector))
    }

    pub fn score_vector(&self, features: &FeatureVector) -> Assessment {
        let outside = features.out_of_range();
        if !outside.is_empty() {
            warn!("readings outside the trained range: {outside:?}");
        }
        let raw = self.model.predict(features);
        // The band is chosen from the unrounded prediction.
        let suggestion = Recommendation::from_score(raw);
        let thi = round_thi(raw);
        debug!("scored {:?} -> {thi} ({suggestion})", features.values());
        Assessment { thi, suggestion }
    }
}
