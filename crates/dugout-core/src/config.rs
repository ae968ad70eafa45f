//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which selects the backend (local store or remote API), the storage
//! namespace and data directory, and the remote server address.
//!
//! Configuration is stored at `~/.config/dugout/config.json`. Environment
//! variables override the file (see `apply_env_overrides`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::DEFAULT_LEAGUE_DOMAIN;
use crate::backend::BackendMode;
use crate::store::local::DEFAULT_NAMESPACE;

/// Application name used for config/data directory paths
const APP_NAME: &str = "dugout";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_MODE: &str = "DUGOUT_MODE";
pub const ENV_API_URL: &str = "DUGOUT_API_URL";
pub const ENV_NAMESPACE: &str = "DUGOUT_NAMESPACE";
pub const ENV_DATA_DIR: &str = "DUGOUT_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mode: BackendMode,
    pub api_base_url: Option<String>,
    pub namespace: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub league_domain: Option<String>,
    pub last_email: Option<String>,
    /// Keep local data in memory only. Set per run, never saved.
    #[serde(skip)]
    pub ephemeral: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `DUGOUT_*` environment variables on top of the file settings.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(mode) = lookup(ENV_MODE) {
            self.mode = BackendMode::parse(&mode)
                .ok_or_else(|| anyhow::anyhow!("{} must be 'local' or 'remote', got '{}'", ENV_MODE, mode))?;
        }
        if let Some(url) = lookup(ENV_API_URL).filter(|s| !s.is_empty()) {
            self.api_base_url = Some(url);
        }
        if let Some(namespace) = lookup(ENV_NAMESPACE).filter(|s| !s.is_empty()) {
            self.namespace = Some(namespace);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|s| !s.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn league_domain(&self) -> &str {
        self.league_domain.as_deref().unwrap_or(DEFAULT_LEAGUE_DOMAIN)
    }

    /// Directory holding collection files, the session and log files.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
