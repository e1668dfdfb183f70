//! Versioned on-disk representation of a trained model.
//!
//! An artifact is a JSON document carrying a format tag, the feature schema
//! version and layout, the neighbor settings, training metadata and the full
//! training partition. Loading checks the header before touching the body so
//! an artifact written by a newer layout is reported as incompatible rather
//! than as malformed.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thi_schema::{Feature, FeatureVector, SCHEMA_VERSION};

use crate::error::ArtifactError;
use crate::knn::{KnnRegressor, Weighting};
use crate::metrics::HoldoutMetrics;

pub const ARTIFACT_FORMAT: &str = "thi-knn";

/// How the stored model was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Rows in the synthesized corpus before splitting.
    pub corpus_size: usize,
    pub synth_seed: Option<u64>,
    pub split_seed: u64,
    pub test_fraction: f64,
    pub holdout: HoldoutMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPartition {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub neighbors: usize,
    pub weighting: Weighting,
    pub metadata: TrainingMetadata,
    pub training: TrainingPartition,
}

#[derive(Deserialize)]
struct ArtifactHeader {
    format: String,
    schema_version: u32,
}

impl ModelArtifact {
    pub fn to_json(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse and check header and feature layout. Model-level validation
    /// happens in [`TrainedModel::from_artifact`].
    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let header: ArtifactHeader = serde_json::from_slice(bytes)?;
        if header.format != ARTIFACT_FORMAT {
            return Err(ArtifactError::UnknownFormat(header.format));
        }
        if header.schema_version != SCHEMA_VERSION {
            return Err(ArtifactError::IncompatibleSchema {
                found: header.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        if artifact.feature_names.iter().map(String::as_str).ne(Feature::names()) {
            return Err(ArtifactError::FeatureMismatch {
                found: artifact.feature_names,
            });
        }
        Ok(artifact)
    }
}

/// A fitted regressor together with its training metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub model: KnnRegressor,
    pub metadata: TrainingMetadata,
}

impl TrainedModel {
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact {
            format: ARTIFACT_FORMAT.to_string(),
            schema_version: SCHEMA_VERSION,
            feature_names: Feature::names().map(str::to_string).to_vec(),
            neighbors: self.model.k(),
            weighting: self.model.weighting(),
            metadata: self.metadata.clone(),
            training: TrainingPartition {
                features: self.model.features().to_vec(),
                targets: self.model.targets().to_vec(),
            },
        }
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        let model = KnnRegressor::fit(
            artifact.training.features,
            artifact.training.targets,
            artifact.neighbors,
            artifact.weighting,
        )?;
        Ok(Self {
            model,
            metadata: artifact.metadata,
        })
    }

    /// Persist atomically: the bytes go to a sibling temp file, which is
    /// synced and then renamed over `path`. The temp file never outlives a
    /// failed save.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_artifact().to_json()?;
        let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir).map_err(|e| ArtifactError::io("create_dir_all", dir, e))?;
        }
        let tmp = temp_path(path);
        if let Err(e) = write_synced(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(ArtifactError::io("rename", path, e));
        }
        if let Some(dir) = dir {
            sync_dir(dir);
        }
        info!(
            "saved model artifact to {} ({} rows, k = {})",
            path.display(),
            self.model.len(),
            self.model.k()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ArtifactError::io("read", path, e))?;
        let trained = Self::from_artifact(ModelArtifact::from_json(&bytes)?)?;
        info!(
            "loaded model artifact from {} ({} rows, k = {}, {:?} weighting)",
            path.display(),
            trained.model.len(),
            trained.model.k(),
            trained.model.weighting()
        );
        Ok(trained)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    let mut file = File::create(path).map_err(|e| ArtifactError::io("create", path, e))?;
    file.write_all(bytes)
        .map_err(|e| ArtifactError::io("write", path, e))?;
    file.sync_all()
        .map_err(|e| ArtifactError::io("sync", path, e))
}

// Makes the rename durable. Not every platform can open a directory, so
// failures are only logged.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        if let Err(e) = handle.sync_all() {
            warn!("directory sync failed after saving into {}: {e}", dir.display());
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tiny_model() -> TrainedModel {
        let features: Vec<FeatureVector> = (0..6)
            .map(|i| FeatureVector::midpoint().with(Feature::Speed, 60.0 + i as f64 * 10.0))
            .collect();
        let targets = vec![100.0, 100.0, 100.0, 100.0, 100.0, 90.0];
        TrainedModel {
            model: KnnRegressor::fit(features, targets, 5, Weighting::Uniform).unwrap(),
            metadata: TrainingMetadata {
                corpus_size: 8,
                synth_seed: Some(1),
                split_seed: 42,
                test_fraction: 0.2,
                holdout: HoldoutMetrics {
                    samples: 2,
                    mae: 1.0,
                    rmse: 1.5,
                    r2: 0.5,
                },
            },
        }
    }

    fn artifact_json(model: &TrainedModel) -> serde_json::Value {
        serde_json::from_slice(&model.to_artifact().to_json().unwrap()).unwrap()
    }

    #[test]
    fn json_round_trip_preserves_model() {
        let model = tiny_model();
        let bytes = model.to_artifact().to_json().unwrap();
        let back = TrainedModel::from_artifact(ModelArtifact::from_json(&bytes).unwrap()).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn header_records_format_and_schema() {
        let json = artifact_json(&tiny_model());
        assert_eq!(json["format"], ARTIFACT_FORMAT);
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
        assert_eq!(json["feature_names"][7], "noise");
        assert_eq!(json["weighting"], "uniform");
    }

    #[test]
    fn rejects_other_formats() {
        let mut json = artifact_json(&tiny_model());
        json["format"] = "pickle".into();
        let err = ModelArtifact::from_json(&serde_json::to_vec(&json).unwrap()).unwrap_err();
        assert!(matches!(err, ArtifactError::UnknownFormat(f) if f == "pickle"));
    }

    #[test]
    fn newer_schema_is_incompatible_even_if_body_differs() {
        let json = serde_json::json!({"format": ARTIFACT_FORMAT, "schema_version": 2, "layers": []});
        let err = ModelArtifact::from_json(&serde_json::to_vec(&json).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::IncompatibleSchema { found: 2, expected: 1 }
        ));
    }

    #[test]
    fn rejects_reordered_features() {
        let mut json = artifact_json(&tiny_model());
        json["feature_names"][0] = "noise".into();
        json["feature_names"][7] = "vibration".into();
        let err = ModelArtifact::from_json(&serde_json::to_vec(&json).unwrap()).unwrap_err();
        assert!(matches!(err, ArtifactError::FeatureMismatch { .. }));
    }

    #[test]
    fn rejects_truncated_rows() {
        let mut json = artifact_json(&tiny_model());
        json["training"]["features"][0] = serde_json::json!([1.0, 2.0]);
        let err = ModelArtifact::from_json(&serde_json::to_vec(&json).unwrap()).unwrap_err();
        assert!(matches!(err, ArtifactError::Malformed(_)));
    }

    #[test]
    fn rejects_neighbor_count_above_rows() {
        let mut json = artifact_json(&tiny_model());
        json["neighbors"] = 50.into();
        let artifact = ModelArtifact::from_json(&serde_json::to_vec(&json).unwrap()).unwrap();
        assert!(matches!(
            TrainedModel::from_artifact(artifact),
            Err(ArtifactError::Invalid(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("thi_model.json");
        let model = tiny_model();
        model.save(&path).unwrap();
        assert!(!dir.path().join("nested").join("thi_model.json.tmp").exists());
        assert_eq!(TrainedModel::load(&path).unwrap(), model);
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("thi_model.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = tiny_model().save(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { op: "rename", .. }));
        assert!(!dir.path().join("thi_model.json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn unwritable_temp_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thi_model.json");
        // The temp path is taken by a directory, so it cannot be created.
        fs::create_dir(dir.path().join("thi_model.json.tmp")).unwrap();

        let err = tiny_model().save(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { op: "create", .. }));
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainedModel::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { op: "read", .. }));
    }
}
