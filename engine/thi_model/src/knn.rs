//! Instance-based k-nearest-neighbor regression.
//!
//! The model keeps its whole training partition and measures plain Euclidean
//! distance on raw physical units. No scaling is applied, so wide-range
//! readings such as voltage (600-800 V) dominate the metric over narrow ones
//! such as axle load (10-25 t). That is a known accuracy limitation, and it
//! shows most on small corpora: with the default 500 samples a query at the
//! midpoint of every range can land a few points below the healthy bands for
//! some seeds, because its nearest rows are picked almost by voltage,
//! current and speed alone. A few thousand samples make that rare.
//! Memory and per-query cost grow linearly with the partition, which is fine
//! for the few hundred rows the pipeline trains on.

use serde::{Deserialize, Serialize};
use thi_schema::FeatureVector;

use crate::error::FitError;

pub const DEFAULT_NEIGHBORS: usize = 5;

/// How neighbor targets are combined into a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Plain mean of the k targets.
    #[default]
    Uniform,
    /// Inverse-distance weighted mean. Exact matches take all of the weight.
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row in the training partition.
    pub index: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnnRegressor {
    k: usize,
    weighting: Weighting,
    features: Vec<FeatureVector>,
    targets: Vec<f64>,
}

impl KnnRegressor {
    /// Store a training partition. Fails when it cannot answer a k-neighbor
    /// query.
    pub fn fit(
        features: Vec<FeatureVector>,
        targets: Vec<f64>,
        k: usize,
        weighting: Weighting,
    ) -> Result<Self, FitError> {
        if k == 0 {
            return Err(FitError::ZeroNeighbors);
        }
        if features.len() != targets.len() {
            return Err(FitError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        if features.len() < k {
            return Err(FitError::TooFewSamples {
                k,
                samples: features.len(),
            });
        }
        if let Some(row) = features
            .iter()
            .zip(&targets)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(FitError::NonFinite(row));
        }
        if let Some(row) = features.iter().position(|x| !x.is_within_scale()) {
            return Err(FitError::OutOfScale(row));
        }
        Ok(Self {
            k,
            weighting,
            features,
            targets,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// The k closest training rows, nearest first. Equal distances are
    /// ordered by training row.
    ///
    /// Distances are finite for any finite query. Queries far beyond
    /// [`thi_schema::MAX_READING_MAGNITUDE`] lose the precision to tell rows
    /// apart and fall back to row order.
    pub fn neighbors(&self, query: &FeatureVector) -> Vec<Neighbor> {
        let mut scored: Vec<(f64, usize)> = self
            .features
            .iter()
            .enumerate()
            .map(|(i, x)| (query.distance(x), i))
            .collect();

        let by_distance =
            |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
        if scored.len() > self.k {
            scored.select_nth_unstable_by(self.k - 1, by_distance);
            scored.truncate(self.k);
        }
        scored.sort_unstable_by(by_distance);

        scored
            .into_iter()
            .map(|(distance, index)| Neighbor { index, distance })
            .collect()
    }

    pub fn predict(&self, query: &FeatureVector) -> f64 {
        let neighbors = self.neighbors(query);
        match self.weighting {
            Weighting::Uniform => self.mean_target(&neighbors),
            Weighting::Distance => {
                let exact: Vec<Neighbor> = neighbors
                    .iter()
                    .copied()
                    .filter(|n| n.distance == 0.0)
                    .collect();
                if !exact.is_empty() {
                    return self.mean_target(&exact);
                }
                let (num, den) = neighbors.iter().fold((0.0, 0.0), |(num, den), n| {
                    let w = 1.0 / n.distance;
                    (num + w * self.targets[n.index], den + w)
                });
                // Weights underflow only for non-finite queries.
                if den > 0.0 && den.is_finite() {
                    num / den
                } else {
                    self.mean_target(&neighbors)
                }
            }
        }
    }

    pub fn predict_batch(&self, queries: &[FeatureVector]) -> Vec<f64> {
        queries.iter().map(|q| self.predict(q)).collect()
    }

    fn mean_target(&self, neighbors: &[Neighbor]) -> f64 {
        let sum: f64 = neighbors.iter().map(|n| self.targets[n.index]).sum();
        sum / neighbors.len() as f64
    }
}
