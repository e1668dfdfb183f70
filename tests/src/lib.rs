//! Shared fixtures for the pipeline tests.

use serde_json::json;
use thi_label::SynthConfig;
use thi_model::{run, TrainerConfig};
use thi_schema::FeatureMap;
use thi_service::HealthIndexService;

/// Readings at the middle of every documented range; the rule scores this 100.
pub fn midpoint_readings() -> FeatureMap {
    object(json!({
        "vibration": 2.55,
        "temperature": 75,
        "axle_load": 17.5,
        "brake_pressure": 6.0,
        "speed": 80,
        "voltage": 700,
        "current": 100,
        "noise": 70
    }))
}

/// Readings past every threshold; the rule scores this 0.
pub fn failing_readings() -> FeatureMap {
    object(json!({
        "vibration": 4.8,
        "temperature": 118,
        "axle_load": 24.5,
        "brake_pressure": 4.1,
        "speed": 128,
        "voltage": 605,
        "current": 148,
        "noise": 98
    }))
}

pub fn trained_service(samples: usize, seed: u64) -> HealthIndexService {
    let trained = run(&SynthConfig::seeded(samples, seed), &TrainerConfig::default())
        .unwrap_or_else(|e| panic!("training fixture failed: {e}"));
    HealthIndexService::from_trained(trained)
}

fn object(value: serde_json::Value) -> FeatureMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("fixture is not an object: {other}"),
    }
}
