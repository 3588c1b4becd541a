//! SDK Configuration
//!
//! Defines configuration options for the OX SDK.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SDKResult;

/// Default loader page size
const DEFAULT_PAGE_SIZE: usize = 50;

/// SDK configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SDKConfig {
    /// Backend API base URL
    pub base_url: String,

    /// Session id sent with every request and used for rampup keys (optional)
    pub session: Option<String>,

    /// Default page size for loaders (default: 50)
    pub page_size: usize,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Keys ignored when computing query signatures (default: `limit`)
    pub ignore_params: Vec<String>,
}

impl Default for SDKConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/api".to_string(),
            session: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            ignore_params: vec!["limit".to_string()],
        }
    }
}

impl SDKConfig {
    /// Create a new SDK config for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the session id
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> SDKResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> SDKResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.base_url.is_empty() {
            return Err(ConfigValidationError::MissingBaseUrl);
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidValue {
                field: "base_url".into(),
                message: "must start with http:// or https://".into(),
            });
        }

        if self.page_size == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "page_size".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.session.as_deref() == Some("") {
            return Err(ConfigValidationError::InvalidValue {
                field: "session".into(),
                message: "must not be empty when set".into(),
            });
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("base_url is required")]
    MissingBaseUrl,

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
