use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Configuration for the name normalizer: suffix list and synonym dictionary
/// are data, not code, so they can be extended without touching the matcher.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct NormalizerConfig {
    /// Legal-entity suffixes stripped when they appear as a trailing whole word.
    pub legal_suffixes: Vec<String>,
    /// Healthcare-terminology rewrites applied as whole-word phrases,
    /// longest phrase first. Values must not themselves appear as keys.
    pub synonyms: Vec<(String, String)>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            legal_suffixes: ["inc", "llc", "corp", "corporation", "co", "ltd"]
                .into_iter()
                .map(String::from)
                .collect(),
            synonyms: [
                ("skilled nursing facility", "snf"),
                ("nursing home", "snf"),
                ("assisted living facility", "alf"),
                ("assisted living", "alf"),
                ("rehabilitation", "rehab"),
                ("healthcare", "health care"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct MatchConfig {
    /// Minimum length of the shorter key for a substring match to count as
    /// Partial. Guards against spurious hits on very short tokens.
    pub min_partial_len: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { min_partial_len: 4 }
    }
}

/// Title keywords for deriving executive seniority. Matched case-insensitively
/// as substrings of the job title; C-level keywords win over manager keywords.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct TitleConfig {
    pub clevel_keywords: Vec<String>,
    pub manager_keywords: Vec<String>,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            clevel_keywords: ["chief", "president", "ceo", "cfo", "coo"]
                .into_iter()
                .map(String::from)
                .collect(),
            manager_keywords: ["manager", "director"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Firm types accepted from the executive directory. Everything else is
/// outside the long-term-care universe and is dropped at load time.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ExecutiveFilterConfig {
    pub allowed_firm_types: Vec<String>,
}

impl Default for ExecutiveFilterConfig {
    fn default() -> Self {
        Self {
            allowed_firm_types: [
                "Assisted Living Facility",
                "Assisted Living Facility Corporation",
                "Skilled Nursing Facility",
                "Skilled Nursing Facility Corporation",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub matching: MatchConfig,
    #[serde(default)]
    pub titles: TitleConfig,
    #[serde(default)]
    pub executives: ExecutiveFilterConfig,
}

impl AppConfig {
    /// Load overrides from a TOML file; missing sections fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matching.min_partial_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "matching.min_partial_len",
                reason: "must be > 0".into(),
            });
        }
        if self.normalizer.legal_suffixes.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "normalizer.legal_suffixes",
                reason: "contains an empty entry".into(),
            });
        }
        for (phrase, canonical) in &self.normalizer.synonyms {
            if phrase.trim().is_empty() || canonical.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "normalizer.synonyms",
                    reason: "contains an empty phrase or replacement".into(),
                });
            }
            // A replacement that is itself a key would make normalize non-idempotent.
            if self
                .normalizer
                .synonyms
                .iter()
                .any(|(other, _)| other == canonical)
            {
                return Err(ConfigError::InvalidValue {
                    field: "normalizer.synonyms",
                    reason: format!("replacement {canonical:?} is also a synonym key"),
                });
            }
        }
        if self.executives.allowed_firm_types.is_empty() {
            return Err(ConfigError::MissingField {
                field: "executives.allowed_firm_types",
            });
        }
        Ok(())
    }
}
