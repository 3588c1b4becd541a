//! OX SDK - Extension points and pooled list collections
//!
//! This crate provides the client-side runtime of the OX Suite. Everything
//! is reachable through the [`SDK`] container:
//!
//! # Core Modules (from ox-core)
//!
//! - **types** - flat records and query parameters
//! - **transport** - the `Transport` trait and the reqwest `ApiClient`
//! - **rampup** - one-shot cache of server-pushed list responses
//!
//! # SDK Modules
//!
//! - **extensions** - named extension points with ordered, replaceable,
//!   disableable contributions
//! - **collections** - signature-keyed collection pool and the paginating
//!   loader filling it
//!
//! # Example
//!
//! ```rust,no_run
//! use ox_sdk::{SDK, SDKConfig};
//! use ox_sdk::extensions::{Baton, Capability, Extension, Outcome};
//! use ox_core::params;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let sdk = SDK::new(SDKConfig::new("https://ox.example.com/api"))?;
//!
//!     let point = sdk.extensions().point("io.ox/mail/list/item").await;
//!     point
//!         .extend([Extension::new("subject").draw(|_, baton| {
//!             Ok(Outcome::Value(baton.get("subject").cloned().unwrap_or_default()))
//!         })])
//!         .await?;
//!
//!     let inbox = sdk.loader("mail").load(&params([("folder", "default0/INBOX")])).await;
//!     for record in inbox.records().await {
//!         let mut baton = Baton::new().with("subject", record["subject"].clone());
//!         point.invoke(&Capability::Draw, &mut baton).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Re-export core modules from ox-core
// ─────────────────────────────────────────────────────────────────────────────

/// Records, query parameters, limit formatting
pub use ox_core::types;

/// Transport trait
pub use ox_core::transport;

/// Rampup cache
pub use ox_core::rampup;

/// Error types from core
pub use ox_core::error as core_error;

// ─────────────────────────────────────────────────────────────────────────────
// SDK-specific modules
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "extensions")]
pub mod extensions;

#[cfg(feature = "collections")]
pub mod collections;

mod config;
mod error;
mod sdk;

// Re-export main SDK types
pub use config::{ConfigValidationError, SDKConfig};
pub use error::{SDKError, SDKResult};
pub use sdk::SDK;

// Re-export feature-gated modules
#[cfg(feature = "extensions")]
pub use extensions::{
    Baton, Capability, Extension, ExtensionError, ExtensionRegistry, Outcome, Point,
};

#[cfg(feature = "collections")]
pub use collections::{
    Collection, CollectionEvent, CollectionLoader, CollectionPool, LoaderConfig, LoaderHooks,
};
