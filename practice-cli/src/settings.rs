//! Settings file for the command-line front end.
//!
//! ```toml
//! [practice]
//! sync_keyword = "Shiatsu"
//!
//! [db]
//! backend = "sqlite"
//! connection_string = "practice.db"
//!
//! [summarizer]
//! model = "gemini-3-flash-preview"
//! ```
//!
//! Every table and every key is optional.

use std::path::{Path, PathBuf};

use practice_core::PracticeConfig;
use practice_core::db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Base URL; the request goes to `{endpoint}/{model}:generateContent`.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub practice: PracticeConfig,
    pub db: DbConfig,
    pub summarizer: SummarizerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            practice: PracticeConfig::default(),
            db: DbConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(
        input: &str,
        path: &Path,
    ) -> Result<Self, SettingsError> {
        toml::from_str(input).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let input = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&input, path)
    }
}
