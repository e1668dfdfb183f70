//! Serving side of the Train Health Index.
//!
//! [`HealthIndexService`] owns a trained model for the lifetime of the
//! process and answers `score(features) -> (thi, suggestion)`. The model is
//! never mutated after load, so a service can be shared across threads
//! without locking.

pub mod error;
pub mod global;
pub mod recommendation;
pub mod service;

pub use error::{ServiceError, UnavailableReason};
pub use recommendation::Recommendation;
pub use service::{round_thi, Assessment, HealthIndexService};
