//! Paginated collections
//!
//! A [`CollectionLoader`] fetches pages of a backend list endpoint into a
//! [`Collection`] pooled by [`CollectionPool`] under the query's signature,
//! so every view asking for the same list shares one set of records.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ox_core::{ApiClient, params};
//! use ox_sdk::collections::{CollectionLoader, CollectionPool, LoaderConfig, Passthrough};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = Arc::new(ApiClient::new("https://ox.example.com/api")?);
//! let pool = Arc::new(CollectionPool::new());
//! let loader = CollectionLoader::new(LoaderConfig::new("mail").with_limit(25), pool, client)
//!     .with_hooks(Arc::new(Passthrough));
//!
//! let inbox = params([("folder", "default0/INBOX")]);
//! let collection = loader.load(&inbox).await;
//! loader.paginate(&inbox).await;
//! println!("{} messages", collection.len().await);
//! # Ok(())
//! # }
//! ```

mod collection;
mod events;
mod loader;
mod pool;
mod signature;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{record_id, Collection};
pub use events::{CollectionEvent, Operation};
pub use loader::{
    CollectionLoader, DefaultHooks, LoaderConfig, LoaderHooks, Passthrough, DEFAULT_LIMIT,
};
pub use pool::CollectionPool;
pub use signature::{signature, DEFAULT_SIGNATURE};
