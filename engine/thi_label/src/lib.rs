//! Ground-truth labeling for the Train Health Index.
//!
//! [`rules`] holds the penalty rule that scores a feature vector; [`synth`]
//! samples the feature space and labels it to build a training corpus.
//! Neither is used on the serving path.

pub mod dataset;
pub mod rules;
pub mod synth;

pub use dataset::{Dataset, LabeledSample};
pub use rules::{health_score, triggered_penalties, Direction, PenaltyRule, PENALTY_RULES};
pub use synth::{synthesize, SynthConfig, SynthError, DEFAULT_SAMPLES};
