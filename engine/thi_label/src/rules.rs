//! Penalty-based health rule.
//!
//! A vehicle starts at 100 and loses a fixed number of points for every
//! reading past its threshold. Penalties are independent and additive; all
//! eight firing together remove exactly 100 points.

use serde::Serialize;
use thi_schema::{Feature, FeatureVector};

/// Score of a vehicle with no penalties.
pub const MAX_SCORE: f64 = 100.0;

/// Side of the threshold that counts as unhealthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PenaltyRule {
    pub feature: Feature,
    pub direction: Direction,
    pub threshold: f64,
    pub penalty: f64,
}

impl PenaltyRule {
    const fn new(feature: Feature, direction: Direction, threshold: f64, penalty: f64) -> Self {
        Self {
            feature,
            direction,
            threshold,
            penalty,
        }
    }

    /// Strict comparison; NaN never triggers.
    pub fn triggers(&self, value: f64) -> bool {
        match self.direction {
            Direction::Above => value > self.threshold,
            Direction::Below => value < self.threshold,
        }
    }
}

/// One rule per feature, in schema order.
pub static PENALTY_RULES: [PenaltyRule; 8] = [
    PenaltyRule::new(Feature::Vibration, Direction::Above, 3.0, 15.0),
    PenaltyRule::new(Feature::Temperature, Direction::Above, 90.0, 20.0),
    PenaltyRule::new(Feature::AxleLoad, Direction::Above, 20.0, 10.0),
    PenaltyRule::new(Feature::BrakePressure, Direction::Below, 5.0, 15.0),
    PenaltyRule::new(Feature::Speed, Direction::Above, 100.0, 10.0),
    PenaltyRule::new(Feature::Voltage, Direction::Below, 650.0, 10.0),
    PenaltyRule::new(Feature::Current, Direction::Above, 120.0, 10.0),
    PenaltyRule::new(Feature::Noise, Direction::Above, 80.0, 10.0),
];

/// Rules that fire for `v`, in schema order.
pub fn triggered_penalties(v: &FeatureVector) -> Vec<&'static PenaltyRule> {
    PENALTY_RULES
        .iter()
        .filter(|rule| rule.triggers(v.get(rule.feature)))
        .collect()
}

/// Ground-truth health score.
///
/// Clamped at 0 from below only; the rule never adds points so it cannot
/// exceed [`MAX_SCORE`].
pub fn health_score(v: &FeatureVector) -> f64 {
    let penalty: f64 = triggered_penalties(v).iter().map(|r| r.penalty).sum();
    (MAX_SCORE - penalty).max(0.0)
}
