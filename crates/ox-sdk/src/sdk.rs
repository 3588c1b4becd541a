//! Main SDK Entry Point
//!
//! Provides the main SDK struct that ties together all components.

use std::sync::Arc;
use std::time::Duration;

use ox_core::{ApiClient, RampupCache, Transport};
use tracing::debug;

use crate::{SDKConfig, SDKResult};

#[cfg(feature = "extensions")]
use crate::extensions::ExtensionRegistry;

#[cfg(feature = "collections")]
use crate::collections::{CollectionLoader, CollectionPool, LoaderConfig};

/// OX SDK - Main entry point
///
/// The SDK owns the process-wide pieces:
/// - Extension registry
/// - Collection pool
/// - Rampup cache and the transport loaders fetch through
///
/// # Example
///
/// ```rust,no_run
/// use ox_sdk::{SDK, SDKConfig};
/// use ox_core::params;
///
/// async fn example() -> anyhow::Result<()> {
///     let sdk = SDK::new(SDKConfig::new("https://ox.example.com/api").with_session("s1"))?;
///
///     let loader = sdk.loader("mail");
///     let inbox = loader.load(&params([("folder", "default0/INBOX")])).await;
///     println!("{} messages", inbox.len().await);
///
///     Ok(())
/// }
/// ```
pub struct SDK {
    /// SDK configuration
    config: SDKConfig,

    /// Transport shared by every loader
    transport: Arc<dyn Transport>,

    /// Server-pushed responses consulted before the network
    rampup: Arc<RampupCache>,

    /// Extension registry
    #[cfg(feature = "extensions")]
    extensions: Arc<ExtensionRegistry>,

    /// Collection pool
    #[cfg(feature = "collections")]
    pool: Arc<CollectionPool>,
}

impl SDK {
    /// Create a new SDK instance talking HTTP to `config.base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The HTTP client cannot be built
    pub fn new(config: SDKConfig) -> SDKResult<Self> {
        config.validate()?;

        let mut client = ApiClient::with_timeout(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        if let Some(ref session) = config.session {
            client = client.with_session(session.clone());
        }

        Self::with_transport(config, Arc::new(client))
    }

    /// Create an SDK instance over a custom transport
    pub fn with_transport(config: SDKConfig, transport: Arc<dyn Transport>) -> SDKResult<Self> {
        config.validate()?;
        debug!("SDK initialised for {}", config.base_url);

        Ok(Self {
            config,
            transport,
            rampup: Arc::new(RampupCache::new()),
            #[cfg(feature = "extensions")]
            extensions: Arc::new(ExtensionRegistry::new()),
            #[cfg(feature = "collections")]
            pool: Arc::new(CollectionPool::new()),
        })
    }

    /// Get the SDK configuration
    pub fn config(&self) -> &SDKConfig {
        &self.config
    }

    /// Get the transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Get the rampup cache
    pub fn rampup(&self) -> &Arc<RampupCache> {
        &self.rampup
    }

    /// Get the extension registry
    #[cfg(feature = "extensions")]
    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// Get the collection pool
    #[cfg(feature = "collections")]
    pub fn pool(&self) -> &Arc<CollectionPool> {
        &self.pool
    }

    /// Loader for a module using the configured page size and ignore list
    #[cfg(feature = "collections")]
    pub fn loader(&self, module: impl Into<String>) -> CollectionLoader {
        let mut config = LoaderConfig::new(module).with_limit(self.config.page_size);
        config.ignore = self.config.ignore_params.clone();
        self.loader_with(config)
    }

    /// Loader for an explicit configuration, sharing this SDK's pool
    #[cfg(feature = "collections")]
    pub fn loader_with(&self, config: LoaderConfig) -> CollectionLoader {
        let loader = CollectionLoader::new(config, self.pool.clone(), self.transport.clone());
        match self.config.session {
            Some(ref session) => loader.with_rampup(self.rampup.clone(), session.clone()),
            None => loader,
        }
    }
}
