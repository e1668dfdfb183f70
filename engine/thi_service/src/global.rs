//! Process-wide inference service.
//!
//! A host loads the model once before it accepts traffic and installs it
//! here; request handlers then call [`score`] without passing the service
//! around. The slot can be filled exactly once and is never replaced.

use std::path::Path;
use std::sync::OnceLock;

use log::info;
use thi_schema::FeatureMap;

use crate::error::{ServiceError, UnavailableReason};
use crate::service::{Assessment, HealthIndexService};

static SERVICE: OnceLock<HealthIndexService> = OnceLock::new();

/// Install `service` as the process-wide instance. Hands the service back
/// if one is already installed.
pub fn install(service: HealthIndexService) -> Result<(), HealthIndexService> {
    SERVICE.set(service)?;
    info!("installed process-wide inference service");
    Ok(())
}

/// Load an artifact and install it. An already installed service is kept
/// and returned without reading `path`.
pub fn load_and_install(path: impl AsRef<Path>) -> Result<&'static HealthIndexService, ServiceError> {
    if let Some(existing) = SERVICE.get() {
        return Ok(existing);
    }
    // A concurrent caller may win the race; either way the slot ends up filled.
    let _ = install(HealthIndexService::load(path)?);
    installed().ok_or(ServiceError::ModelUnavailable(UnavailableReason::NotInstalled))
}

pub fn installed() -> Option<&'static HealthIndexService> {
    SERVICE.get()
}

/// Score against the installed service.
pub fn score(features: &FeatureMap) -> Result<Assessment, ServiceError> {
    SERVICE
        .get()
        .ok_or(ServiceError::ModelUnavailable(UnavailableReason::NotInstalled))?
        .score(features)
}
