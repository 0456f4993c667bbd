//! Configuration file.
//!
//! Settings are read from a TOML file given with `--config`, or from the
//! platform config folder:
//! - macOS: ~/Library/Application Support/com.importmap.importmap/
//! - Windows: %APPDATA%/importmap/importmap/config/
//! - Linux: ~/.config/importmap/
//!
//! Every section is optional. Command-line flags override file values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use importmap_map::{MappingError, MappingState, MatchThresholds, MatchingEngine, SynonymDictionary};
use importmap_model::{CaptionSlot, DEFAULT_CAPTIONS, ImportOptions};
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "importmap";
const APP_NAME: &str = "importmap";
const CONFIG_FILENAME: &str = "config.toml";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportOptions,
    pub matching: MatchingConfig,
    pub captions: CaptionsConfig,
    /// Extra phrasings per caption, added to the built-in ones.
    pub synonyms: BTreeMap<String, Vec<String>>,
    pub provider: ProviderConfig,
}

/// `[matching]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub acceptance_threshold: f32,
    pub certainty_threshold: f32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        let thresholds = MatchThresholds::default();
        Self {
            acceptance_threshold: thresholds.acceptance,
            certainty_threshold: thresholds.certainty,
        }
    }
}

/// `[captions]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionsConfig {
    /// Caption slots in display and export order.
    pub slots: Vec<String>,
    /// Captions that establish record identity downstream.
    pub key_fields: Vec<String>,
    /// Captions used downstream to match existing records by id.
    pub match_by_id: Vec<String>,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_CAPTIONS.iter().map(|c| (*c).to_string()).collect(),
            key_fields: vec!["Reference".to_string()],
            match_by_id: vec!["Reference".to_string()],
        }
    }
}

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Suggestion service URL. No provider is used when unset.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: importmap_map::DEFAULT_PROVIDER_TIMEOUT.as_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Validated matching thresholds.
    pub fn thresholds(&self) -> Result<MatchThresholds, MappingError> {
        MatchThresholds::new(
            self.matching.acceptance_threshold,
            self.matching.certainty_threshold,
        )
    }

    /// Built-in synonyms extended with the `[synonyms]` section.
    pub fn synonym_dictionary(&self) -> SynonymDictionary {
        let mut dictionary = SynonymDictionary::builtin();
        for (caption, phrasings) in &self.synonyms {
            dictionary.extend(caption, phrasings.iter().map(String::as_str));
        }
        dictionary
    }

    pub fn engine(&self) -> Result<MatchingEngine, MappingError> {
        Ok(MatchingEngine::new(self.synonym_dictionary(), self.thresholds()?))
    }

    /// Initial mapping state from the `[captions]` section.
    pub fn mapping_state(&self) -> Result<MappingState, MappingError> {
        let is_listed = |list: &[String], caption: &str| {
            list.iter()
                .any(|c| importmap_model::caption_key(c) == importmap_model::caption_key(caption))
        };
        let slots = self
            .captions
            .slots
            .iter()
            .enumerate()
            .map(|(order, caption)| {
                CaptionSlot::new(caption.trim(), order).with_identity(
                    is_listed(&self.captions.key_fields, caption),
                    is_listed(&self.captions.match_by_id, caption),
                )
            })
            .collect();
        MappingState::new(slots)
    }
}

/// Path of the config file in the platform config folder.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Parse a config file.
pub fn read_config(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))
}

/// Load configuration.
///
/// An explicit path must exist and parse. The platform file is optional: when
/// it is missing or broken the defaults are used.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let config = read_config(path)?;
        tracing::info!(path = %path.display(), "Loaded config");
        return Ok(config);
    }

    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config path, using defaults");
        return Ok(Config::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }
    match read_config(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "Loaded config");
            Ok(config)
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), "{error:#}, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use importmap_model::{DateFormat, Delimiter};

    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.provider.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_sections_parse() {
        let config: Config = toml::from_str(
            r#"
            [import]
            delimiter = "tab"
            date_format = "YYYY-MM-DD"

            [matching]
            acceptance_threshold = 0.8

            [captions]
            slots = ["Employee ID", "Email", "Phone"]
            key_fields = ["employee id"]

            [synonyms]
            "Phone" = ["contact number"]

            [provider]
            endpoint = "http://localhost:8080/suggest"
            "#,
        )
        .unwrap();

        assert_eq!(config.import.delimiter, Delimiter::Tab);
        assert!(config.import.has_header);
        assert_eq!(config.import.date_format, DateFormat::YearMonthDay);
        assert_eq!(config.matching.certainty_threshold, 0.97);
        assert_eq!(config.provider.timeout_secs, 10);

        let state = config.mapping_state().unwrap();
        assert_eq!(state.captions(), vec!["Employee ID", "Email", "Phone"]);
        let id = state.slot("Employee ID").unwrap();
        assert!(id.key_field && !id.match_by_id);

        assert!(config.synonym_dictionary().is_exact_phrasing("Contact Number", "Phone"));
    }

    #[test]
    fn test_bad_thresholds_rejected() {
        let mut config = Config::default();
        config.matching.acceptance_threshold = 0.99;
        assert!(config.engine().is_err());
    }

    #[test]
    fn test_duplicate_slots_rejected() {
        let mut config = Config::default();
        config.captions.slots.push("email".to_string());
        assert!(config.mapping_state().is_err());
    }

    #[test]
    fn test_default_round_trip() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
