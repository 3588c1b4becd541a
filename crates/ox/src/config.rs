//! Configuration management for ox.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (OX_BASE_URL, OX_SESSION)
//! 2. Config file ($OX_CONFIG or ~/.config/ox/config.toml)
//! 3. Default values

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ox_sdk::SDKConfig;

use crate::error::OxError;

/// Effective CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the file was looked up
    pub path: PathBuf,

    /// Whether that file existed
    pub from_file: bool,

    /// SDK settings after env overrides
    pub sdk: SDKConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = Self::config_path(&env);
        let from_file = path.exists();

        let mut sdk = if from_file {
            Self::read(&path)?
        } else {
            SDKConfig::default()
        };

        if let Some(url) = env("OX_BASE_URL") {
            sdk.base_url = url;
        }
        if let Some(session) = env("OX_SESSION") {
            sdk.session = Some(session);
        }

        sdk.validate()
            .map_err(|e| OxError::Config(format!("{} ({})", e, path.display())))?;

        Ok(Self {
            path,
            from_file,
            sdk,
        })
    }

    fn read(path: &Path) -> Result<SDKConfig> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Get the config file path.
    pub fn config_path(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(path) = env("OX_CONFIG") {
            PathBuf::from(path)
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("ox")
                .join("config.toml")
        }
    }
}
