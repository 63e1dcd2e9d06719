//! Client Settings
//!
//! Where to reach the server and how long to wait for it. Persisted as TOML in
//! the platform config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::constants::{
    BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_FEEDBACK_FILE, DEFAULT_LOAD_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::Result;
use crate::helpers::get_or_create_config_dir;

const SETTINGS_FILE: &str = "dl-config-store.toml";

/// Persisted client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Server base url, without the api path
    pub base_url: String,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
    /// Upper bound for a whole configuration load
    pub load_timeout_secs: u64,
    /// File in the data directory holding feedback toggles
    pub feedback_file: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
            feedback_file: DEFAULT_FEEDBACK_FILE.to_string(),
        }
    }
}

fn get_settings_path() -> Result<PathBuf> {
    let config_dir = get_or_create_config_dir()?;
    Ok(config_dir.join(SETTINGS_FILE))
}

impl ClientSettings {
    /// Load settings from the config directory, applying env overrides
    pub fn try_load() -> Result<Self> {
        let path = get_settings_path()?;
        let mut settings = Self::load_from(&path)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Load settings from a specific file; a missing or empty file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        info!(path = ?path, "Loading settings file");
        let value = std::fs::read_to_string(path)?;
        if value.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = toml::from_str(&value).map_err(|e| {
            error!(error = %e, path = ?path, "Failed to parse settings file");
            e
        })?;
        Ok(settings)
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let value = toml::to_string_pretty(self)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    /// Override fields from the environment
    pub fn apply_env(&mut self) {
        self.override_base_url(std::env::var(BASE_URL_ENV).ok());
    }

    fn override_base_url(&mut self, url: Option<String>) {
        if let Some(url) = url
            && !url.trim().is_empty()
        {
            self.base_url = url;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}
