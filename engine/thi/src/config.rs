//! `thi.toml` configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thi_label::SynthConfig;
use thi_model::TrainerConfig;
use thiserror::Error;

pub const CONFIG_FILE: &str = "thi.toml";
pub const DEFAULT_MODEL_PATH: &str = "thi_model.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThiConfig {
    /// Where `train` writes and `score` reads the model artifact.
    pub model_path: PathBuf,
    pub synth: SynthConfig,
    pub trainer: TrainerConfig,
}

impl Default for ThiConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            synth: SynthConfig::default(),
            trainer: TrainerConfig::default(),
        }
    }
}

impl ThiConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read an explicit config file, or `thi.toml` in the working directory
    /// when present, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(CONFIG_FILE);
                if !p.exists() {
                    log::debug!("no {CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text, &path)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use thi_model::Weighting;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = ThiConfig::parse("", Path::new("thi.toml")).unwrap();
        assert_eq!(cfg, ThiConfig::default());
    }

    #[test]
    fn reads_all_sections() {
        let text = r#"
            model_path = "models/thi.json"

            [synth]
            samples = 800
            seed = 7

            [trainer]
            neighbors = 3
            weighting = "distance"
            test_fraction = 0.25
            split_seed = 1
        "#;
        let cfg = ThiConfig::parse(text, Path::new("thi.toml")).unwrap();
        assert_eq!(cfg.model_path, PathBuf::from("models/thi.json"));
        assert_eq!(cfg.synth, SynthConfig::seeded(800, 7));
        assert_eq!(
            cfg.trainer,
            TrainerConfig {
                neighbors: 3,
                weighting: Weighting::Distance,
                test_fraction: 0.25,
                split_seed: 1,
            }
        );
    }

    #[test]
    fn rejects_unknown_weighting() {
        let err = ThiConfig::parse("[trainer]\nweighting = \"gaussian\"\n", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid 'x.toml'"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ThiConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
