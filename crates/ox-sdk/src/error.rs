//! SDK Error Types
//!
//! Defines error types for the OX SDK.

use thiserror::Error;

/// SDK Result type alias
pub type SDKResult<T> = Result<T, SDKError>;

/// SDK errors
#[derive(Debug, Error)]
pub enum SDKError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),

    /// Backend or transport error
    #[error("transport error: {0}")]
    Transport(#[from] ox_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SDKError {
    /// Check if the backend reported the module as not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_not_found())
    }
}
