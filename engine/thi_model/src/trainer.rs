//! Offline training job: synthesize, split, fit, evaluate, persist.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thi_label::{synthesize, Dataset, SynthConfig};
use thi_schema::FeatureVector;

use crate::artifact::{TrainedModel, TrainingMetadata};
use crate::error::{SplitError, TrainError};
use crate::knn::{KnnRegressor, Weighting, DEFAULT_NEIGHBORS};
use crate::metrics::HoldoutMetrics;
use crate::split::{train_test_split, DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub neighbors: usize,
    pub weighting: Weighting,
    /// Share of the corpus held out for evaluation.
    pub test_fraction: f64,
    pub split_seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            weighting: Weighting::Uniform,
            test_fraction: DEFAULT_TEST_FRACTION,
            split_seed: DEFAULT_SPLIT_SEED,
        }
    }
}

/// Fit a regressor on the training partition of `dataset` and score it on
/// the held-out rows.
pub fn train(config: &TrainerConfig, dataset: &Dataset) -> Result<TrainedModel, TrainError> {
    let split = train_test_split(dataset.len(), config.test_fraction, config.split_seed)?;
    let samples = dataset.samples();

    let pick = |rows: &[usize]| -> (Vec<FeatureVector>, Vec<f64>) {
        rows.iter()
            .map(|&i| (samples[i].features, samples[i].thi_score))
            .unzip()
    };
    let (train_x, train_y) = pick(&split.train);
    let (test_x, test_y) = pick(&split.test);

    let model = KnnRegressor::fit(train_x, train_y, config.neighbors, config.weighting)?;
    let predictions = model.predict_batch(&test_x);
    let holdout = HoldoutMetrics::compute(&predictions, &test_y).ok_or(SplitError::Degenerate {
        len: dataset.len(),
        train: split.train.len(),
        test: split.test.len(),
    })?;

    info!(
        "fitted k = {} ({:?}) on {} rows; held-out MAE {:.3}, RMSE {:.3}, R² {:.3} over {} rows",
        model.k(),
        model.weighting(),
        model.len(),
        holdout.mae,
        holdout.rmse,
        holdout.r2,
        holdout.samples
    );

    Ok(TrainedModel {
        model,
        metadata: TrainingMetadata {
            corpus_size: dataset.len(),
            synth_seed: None,
            split_seed: config.split_seed,
            test_fraction: config.test_fraction,
            holdout,
        },
    })
}

/// Synthesize a corpus and train on it.
pub fn run(synth: &SynthConfig, trainer: &TrainerConfig) -> Result<TrainedModel, TrainError> {
    let dataset = synthesize(synth)?;
    let mut trained = train(trainer, &dataset)?;
    trained.metadata.synth_seed = synth.seed;
    Ok(trained)
}

/// The offline `train()` entry point. Nothing is written unless every step
/// before persistence succeeded.
pub fn train_to_path(
    synth: &SynthConfig,
    trainer: &TrainerConfig,
    path: impl AsRef<Path>,
) -> Result<TrainedModel, TrainError> {
    let trained = run(synth, trainer)?;
    trained.save(path)?;
    Ok(trained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitError;
    use thi_label::health_score;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn default_config_matches_reference_pipeline() {
        let cfg = TrainerConfig::default();
        assert_eq!(cfg.neighbors, 5);
        assert_eq!(cfg.weighting, Weighting::Uniform);
        assert_eq!(cfg.test_fraction, 0.2);
        assert_eq!(cfg.split_seed, 42);
    }

    #[test]
    fn trains_on_eighty_percent() {
        init_logger();
        let trained = run(&SynthConfig::seeded(500, 1), &TrainerConfig::default()).unwrap();
        assert_eq!(trained.model.len(), 400);
        assert_eq!(trained.metadata.corpus_size, 500);
        assert_eq!(trained.metadata.holdout.samples, 100);
        assert_eq!(trained.metadata.synth_seed, Some(1));
    }

    #[test]
    fn stored_targets_are_rule_labels() {
        let trained = run(&SynthConfig::seeded(100, 4), &TrainerConfig::default()).unwrap();
        for (x, y) in trained.model.features().iter().zip(trained.model.targets()) {
            assert_eq!(*y, health_score(x));
        }
    }

    #[test]
    fn learns_something_useful() {
        let trained = run(&SynthConfig::seeded(2000, 8), &TrainerConfig::default()).unwrap();
        let h = trained.metadata.holdout;
        assert!(h.mae < 20.0, "held-out MAE {}", h.mae);
        assert!(h.rmse >= h.mae);
    }

    #[test]
    fn too_small_corpus_fails_before_fit() {
        let err = run(&SynthConfig::seeded(1, 0), &TrainerConfig::default()).unwrap_err();
        assert!(matches!(err, TrainError::Split(SplitError::Degenerate { .. })));
    }

    #[test]
    fn training_partition_smaller_than_k_fails() {
        // 5 rows: 1 held out, 4 left for k = 5
        let err = run(&SynthConfig::seeded(5, 0), &TrainerConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TrainError::Fit(FitError::TooFewSamples { k: 5, samples: 4 })
        ));
    }

    #[test]
    fn failed_training_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thi_model.json");
        let cfg = TrainerConfig {
            neighbors: 0,
            ..TrainerConfig::default()
        };
        assert!(train_to_path(&SynthConfig::seeded(50, 1), &cfg, &path).is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn config_reads_partial_documents() {
        let cfg: TrainerConfig =
            serde_json::from_str(r#"{"weighting": "distance", "neighbors": 3}"#).unwrap();
        assert_eq!(cfg.weighting, Weighting::Distance);
        assert_eq!(cfg.neighbors, 3);
        assert_eq!(cfg.split_seed, DEFAULT_SPLIT_SEED);
    }
}
