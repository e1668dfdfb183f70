//! Maintenance recommendation bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maintenance urgency derived from a health score.
///
/// Variants are declared from least to most healthy, so the derived
/// ordering makes [`Recommendation::from_score`] non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Immediate shutdown & servicing")]
    ImmediateShutdown,
    #[serde(rename = "Urgent maintenance required")]
    UrgentMaintenance,
    #[serde(rename = "Preemptive repair needed")]
    PreemptiveRepair,
    #[serde(rename = "Routine maintenance suggested")]
    RoutineMaintenance,
    #[serde(rename = "No action required")]
    NoAction,
}

impl Recommendation {
    /// Most urgent first.
    pub const ALL: [Recommendation; 5] = [
        Recommendation::ImmediateShutdown,
        Recommendation::UrgentMaintenance,
        Recommendation::PreemptiveRepair,
        Recommendation::RoutineMaintenance,
        Recommendation::NoAction,
    ];

    /// Step function with inclusive lower bounds 90, 70, 50 and 30.
    /// Anything below 30, including NaN, calls for a shutdown.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Recommendation::NoAction
        } else if score >= 70.0 {
            Recommendation::RoutineMaintenance
        } else if score >= 50.0 {
            Recommendation::PreemptiveRepair
        } else if score >= 30.0 {
            Recommendation::UrgentMaintenance
        } else {
            Recommendation::ImmediateShutdown
        }
    }

    /// Inclusive lower score bound of the band, `None` for the open bottom band.
    pub fn lower_bound(self) -> Option<f64> {
        match self {
            Recommendation::NoAction => Some(90.0),
            Recommendation::RoutineMaintenance => Some(70.0),
            Recommendation::PreemptiveRepair => Some(50.0),
            Recommendation::UrgentMaintenance => Some(30.0),
            Recommendation::ImmediateShutdown => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Recommendation::NoAction => "No action required",
            Recommendation::RoutineMaintenance => "Routine maintenance suggested",
            Recommendation::PreemptiveRepair => "Preemptive repair needed",
            Recommendation::UrgentMaintenance => "Urgent maintenance required",
            Recommendation::ImmediateShutdown => "Immediate shutdown & servicing",
        }
    }

    /// 0 for no action up to 4 for immediate shutdown.
    pub fn severity(self) -> u8 {
        4 - self as u8
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
