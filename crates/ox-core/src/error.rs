//! Error types for ox-core.

use thiserror::Error;

/// Result type alias using ox-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for transport operations
#[derive(Error, Debug)]
pub enum Error {
    // Transport errors
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from {module}: {message}")]
    InvalidResponse { module: String, message: String },

    // Configuration errors
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error for a response body that is not a list of records
    pub fn invalid_response(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Api {
            status: 503,
            body: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "API error 503: maintenance");

        let err = Error::invalid_response("mail", "expected array");
        assert!(err.to_string().contains("mail"));
        assert!(!err.is_not_found());

        assert!(Error::NotFound("/api/mail".into()).is_not_found());
    }
}
