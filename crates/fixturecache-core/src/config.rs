//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the selected team and an optional API base URL override.
//!
//! Configuration is stored at `~/.config/fixturecache/config.json`.
//! `FIXTURECACHE_TEAM` and `FIXTURECACHE_API_URL` override the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_BASE_URL;
use crate::settings::SettingsProvider;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "fixturecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Team used until the user picks one
pub const DEFAULT_TEAM: &str = "arsenal";

pub const TEAM_ENV: &str = "FIXTURECACHE_TEAM";
pub const API_URL_ENV: &str = "FIXTURECACHE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub team: Option<String>,
    pub api_url: Option<String>,
    /// Team the cached football fixtures were fetched for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_team: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
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

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn api_url(&self) -> String {
        Self::resolve(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Record `team` as the owner of the cached fixtures. Returns `true`
    /// when that changes the recorded team, meaning the cached football
    /// entry belongs to someone else and must be dropped.
    pub fn record_cached_team(&mut self, team: &str) -> bool {
        if self.cached_team.as_deref() == Some(team) {
            return false;
        }
        self.cached_team = Some(team.to_string());
        true
    }

    /// First non-blank of the environment override and the file value
    fn resolve(env: Option<String>, file: Option<&str>) -> Option<String> {
        env.into_iter()
            .chain(file.map(str::to_string))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

impl SettingsProvider for Config {
    fn team(&self) -> String {
        Self::resolve(std::env::var(TEAM_ENV).ok(), self.team.as_deref())
            .unwrap_or_else(|| DEFAULT_TEAM.to_string())
            .to_lowercase()
    }
}
