//! Reader configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::DataError;

const APP_DIR: &str = "bsb-reader";
const CONFIG_FILE: &str = "config.json";
const PREFERENCES_FILE: &str = "preferences.json";

/// Audio host for the BSB chapter recordings
pub const DEFAULT_AUDIO_BASE_URL: &str =
    "https://raw.githubusercontent.com/ryancornett/Bible_Audio/main/BSB/";

/// Chapter markup served by a local text host
pub const DEFAULT_CONTENT_URL_TEMPLATE: &str =
    "http://127.0.0.1:8080/{translation}/{book}/{chapter}.html";

/// Settings read from `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Translation code substituted into the content URL
    pub translation: String,

    /// Chapter URL with `{translation}`, `{book}` and `{chapter}` placeholders
    pub content_url_template: String,

    pub request_timeout_secs: u64,

    /// Base URL the audio file paths are joined to
    pub audio_base_url: String,

    /// JSON manifest of audio files; the slug scheme is used when absent
    pub audio_manifest: Option<PathBuf>,

    /// Wrap from the last chapter of the corpus back to the first
    pub wrap: bool,

    /// Preference file; defaults to the user config directory
    pub preferences_path: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            translation: "BSB".to_string(),
            content_url_template: DEFAULT_CONTENT_URL_TEMPLATE.to_string(),
            request_timeout_secs: 30,
            audio_base_url: DEFAULT_AUDIO_BASE_URL.to_string(),
            audio_manifest: None,
            wrap: true,
            preferences_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl ReaderConfig {
    /// `~/.config/bsb-reader` or the platform equivalent
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| DataError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, or defaults if there is none
    pub fn load_default() -> Result<Self, DataError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DataError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.translation.trim().is_empty() {
            return Err(DataError::Config("translation must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(DataError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Where preferences are stored
    pub fn preferences_file(&self) -> Option<PathBuf> {
        self.preferences_path
            .clone()
            .or_else(|| Self::config_dir().map(|dir| dir.join(PREFERENCES_FILE)))
    }
}
