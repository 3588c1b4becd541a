//! Error types for ox.

use thiserror::Error;

/// Main error type for ox operations.
#[derive(Error, Debug)]
pub enum OxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to {operation} {module}: {error}")]
    LoadFailed {
        module: String,
        operation: String,
        error: String,
    },
}
