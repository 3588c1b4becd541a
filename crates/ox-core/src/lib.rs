//! ox-core - Core library for OX Suite
//!
//! This crate provides the transport boundary shared by the SDK and the CLI:
//!
//! - **types**: flat records, query parameters, limit formatting
//! - **transport**: the `Transport` trait list loaders fetch through
//! - **client**: reqwest-backed `ApiClient` implementing `Transport`
//! - **rampup**: one-shot cache of server-pushed list responses

#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod rampup;
pub mod transport;
pub mod types;

// Re-export commonly used types
#[cfg(feature = "client")]
pub use client::ApiClient;
pub use error::{Error, Result};
pub use rampup::RampupCache;
pub use transport::Transport;
pub use types::{encode_query, format_limit, params, QueryParams, Record};
