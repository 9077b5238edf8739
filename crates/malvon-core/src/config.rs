//! Browser configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use malvon_history::DEFAULT_BATCH_SIZE;
use malvon_profile::ProfileOptions;
use malvon_suggest::{SuggestionSettings, GOOGLE_SUGGEST_ENDPOINT};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the registry, history databases and tab groups
    pub data_dir: PathBuf,
    /// Profile opened at startup
    pub default_profile: String,
    /// Buffered history visits before a flush
    pub history_batch_size: usize,
    pub local_debounce_ms: u64,
    pub remote_debounce_ms: u64,
    /// Remote suggestion endpoint
    pub suggest_endpoint: String,
    pub suggest_timeout_ms: u64,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let suggestions = SuggestionSettings::default();

        Self {
            data_dir,
            default_profile: "Default".to_string(),
            history_batch_size: DEFAULT_BATCH_SIZE,
            local_debounce_ms: suggestions.local_debounce.as_millis() as u64,
            remote_debounce_ms: suggestions.remote_debounce.as_millis() as u64,
            suggest_endpoint: GOOGLE_SUGGEST_ENDPOINT.to_string(),
            suggest_timeout_ms: 5_000,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("Malvon"))
            .unwrap_or_else(|| PathBuf::from(".malvon"))
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let config: Config = serde_json::from_slice(&data)?;
        config.validate()?;

        tracing::info!(path = %path.as_ref().display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_batch_size == 0 {
            return Err(CoreError::Config(
                "history_batch_size must be at least 1".to_string(),
            ));
        }
        if self.default_profile.is_empty() {
            return Err(CoreError::Config("default_profile cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join("profiles.sqlite")
    }

    pub fn search_data_path(&self) -> PathBuf {
        self.data_dir.join("searchData.sqlite")
    }

    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            data_dir: self.data_dir.clone(),
            history_batch_size: self.history_batch_size,
        }
    }

    pub fn suggestion_settings(&self) -> SuggestionSettings {
        SuggestionSettings {
            local_debounce: Duration::from_millis(self.local_debounce_ms),
            remote_debounce: Duration::from_millis(self.remote_debounce_ms),
            ..SuggestionSettings::default()
        }
    }

    pub fn suggest_timeout(&self) -> Duration {
        Duration::from_millis(self.suggest_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Per-platform application data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
