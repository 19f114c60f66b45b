//! Configuration for the reputation core.

use serde::{Deserialize, Serialize};

use crate::keywords::{KeywordCatalog, DEFAULT_TOP_KEYWORDS, MAX_KEYWORDS, MIN_KEYWORDS};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Comment threading
    pub thread: ThreadConfig,
    /// Keyword ranking
    pub ranking: RankingConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl ReputationConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Comment threading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Deepest reply level a new reply may land on (top level is 0)
    pub max_depth: usize,
    /// Body shown in place of a hidden secret comment
    pub secret_placeholder: String,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            secret_placeholder: "비밀 댓글입니다.".to_string(),
        }
    }
}

/// Keyword ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Tags kept in the ranked view
    pub top_keywords: usize,
    /// Fewest tags per submission
    pub min_keywords: usize,
    /// Most tags per submission
    pub max_keywords: usize,
    /// Tag polarity used for trait summaries
    pub catalog: KeywordCatalog,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_keywords: DEFAULT_TOP_KEYWORDS,
            min_keywords: MIN_KEYWORDS,
            max_keywords: MAX_KEYWORDS,
            catalog: KeywordCatalog::default(),
        }
    }
}

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
