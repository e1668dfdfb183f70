//! Regression quality on the held-out partition.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    /// Number of held-out rows scored.
    pub samples: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Coefficient of determination. 1.0 for a perfect fit on constant
    /// labels, 0.0 for an imperfect one.
    pub r2: f64,
}

impl HoldoutMetrics {
    /// Compare predictions against labels. Returns `None` on empty or
    /// mismatched input.
    pub fn compute(predictions: &[f64], labels: &[f64]) -> Option<Self> {
        if predictions.is_empty() || predictions.len() != labels.len() {
            return None;
        }
        let n = labels.len() as f64;
        let mut abs = 0.0;
        let mut sq = 0.0;
        for (p, y) in predictions.iter().zip(labels) {
            let e = p - y;
            abs += e.abs();
            sq += e * e;
        }
        let mean = labels.iter().sum::<f64>() / n;
        let total: f64 = labels.iter().map(|y| (y - mean) * (y - mean)).sum();
        let r2 = if total == 0.0 {
            if sq == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - sq / total
        };
        Some(Self {
            samples: labels.len(),
            mae: abs / n,
            rmse: (sq / n).sqrt(),
            r2,
        })
    }
}
