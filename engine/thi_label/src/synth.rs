//! Synthetic corpus generation.
//!
//! Every feature column is drawn independently and uniformly from its
//! documented range, then each row is labeled with [`health_score`].

use log::{debug, info};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thi_schema::{Feature, FeatureVector, FEATURE_COUNT};
use thiserror::Error;

use crate::dataset::{Dataset, LabeledSample};
use crate::rules::health_score;

pub const DEFAULT_SAMPLES: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthError {
    #[error("cannot synthesize an empty corpus")]
    EmptyCorpus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Number of rows to draw.
    pub samples: usize,
    /// RNG seed. `None` draws from OS entropy and output varies run to run.
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seed: None,
        }
    }
}

impl SynthConfig {
    pub fn seeded(samples: usize, seed: u64) -> Self {
        Self {
            samples,
            seed: Some(seed),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Draw `config.samples` labeled rows.
pub fn synthesize(config: &SynthConfig) -> Result<Dataset, SynthError> {
    if config.samples == 0 {
        return Err(SynthError::EmptyCorpus);
    }
    let n = config.samples;
    let mut rng = config.rng();

    // Column-major draw: all vibration readings, then all temperatures, ...
    let mut rows = vec![[0.0f64; FEATURE_COUNT]; n];
    for feature in Feature::ALL {
        let range = feature.range();
        let dist = Uniform::new(range.min, range.max);
        for row in rows.iter_mut() {
            row[feature.index()] = dist.sample(&mut rng);
        }
        debug!("sampled {n} values for {feature} in [{}, {})", range.min, range.max);
    }

    let dataset: Dataset = rows
        .into_iter()
        .map(|row| {
            let features = FeatureVector::new(row);
            LabeledSample::new(features, health_score(&features))
        })
        .collect();

    info!(
        "synthesized {} samples (seed: {})",
        dataset.len(),
        config
            .seed
            .map_or_else(|| "entropy".to_string(), |s| s.to_string())
    );
    Ok(dataset)
}
