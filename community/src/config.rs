//! Service configuration.

use serde::{Deserialize, Serialize};

use reputation::ReputationConfig;

/// Configuration for the community service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    /// Core settings (threading, ranking, logging)
    #[serde(flatten)]
    pub reputation: ReputationConfig,
    /// Most notifications returned per inbox listing
    pub inbox_limit: usize,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            reputation: ReputationConfig::default(),
            inbox_limit: 50,
        }
    }
}

impl CommunityConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load config from a YAML file on disk.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&text)?)
    }
}

/// Failure loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}
