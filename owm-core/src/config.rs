use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::client::CurrentWeatherClient;

/// Configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "http://api.openweathermap.org/data/2.5"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// OpenWeatherMap APPID.
    pub api_key: Option<String>,

    /// Overrides the provider base URL, mostly useful for proxies and tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "owm-facade", "owm")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Store the API key, trimmed. Blank keys are rejected.
    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            bail!("API key must not be empty");
        }

        self.api_key = Some(api_key.to_string());
        Ok(())
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `owm configure` or set OWM_API_KEY."
                )
            })
    }

    /// Build a client from the configured key and base URL.
    pub fn client(&self) -> Result<CurrentWeatherClient> {
        let client = CurrentWeatherClient::new(self.api_key()?)?;

        match &self.base_url {
            Some(base_url) => client
                .with_base_url(base_url)
                .with_context(|| format!("Invalid base_url in config: {base_url}")),
            None => Ok(client),
        }
    }
}
