//! HTTP API client for list endpoints.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ox_core::client::ApiClient;
//! use ox_core::{params, Transport};
//!
//! #[tokio::main]
//! async fn main() -> ox_core::Result<()> {
//!     let client = ApiClient::new("https://groupware.example.com/api")?.with_session("s3cr3t");
//!     let records = client
//!         .get("mail", &params([("action", "all"), ("limit", "0,50")]))
//!         .await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{parse_records, QueryParams, Record};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API client for backend list endpoints
#[derive(Clone)]
pub struct ApiClient {
    /// Base URL, without trailing slash
    base_url: String,
    /// Session id appended as the `session` query parameter
    session: Option<String>,
    /// HTTP client
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new API client with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidBaseUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
            client,
        })
    }

    /// Set the session id sent with every request
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for a module endpoint
    fn module_url(&self, module: &str) -> String {
        format!("{}/{}", self.base_url, module.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn get(&self, module: &str, params: &QueryParams) -> Result<Vec<Record>> {
        let url = self.module_url(module);
        debug!("API request: GET {} {:?}", url, params);

        let mut query: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(ref session) = self.session {
            query.push(("session", session.as_str()));
        }

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let body: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| Error::invalid_response(module, e.to_string()))?;
            parse_records(module, body)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(Error::NotFound(module.to_string()))
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://localhost:8009/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8009/api");
        assert_eq!(client.module_url("/mail"), "http://localhost:8009/api/mail");
    }

    #[test]
    fn test_api_client_rejects_bad_url() {
        let result = ApiClient::new("localhost:8009");
        assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
    }
}
