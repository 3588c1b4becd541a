//! Collection Pool
//!
//! Identity map from `(module, signature)` to the one live collection for
//! that pair.

use std::collections::HashMap;
use std::sync::Arc;

use ox_core::Record;
use tokio::sync::RwLock;
use tracing::debug;

use super::collection::Collection;

/// Process-wide pool of collections
#[derive(Debug, Default)]
pub struct CollectionPool {
    /// module -> signature -> collection
    collections: RwLock<HashMap<String, HashMap<String, Arc<Collection>>>>,
}

impl CollectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the collection for a module and signature, creating it if absent.
    pub async fn get(&self, module: &str, signature: &str) -> Arc<Collection> {
        if let Some(collection) = self.find(module, signature).await {
            return collection;
        }

        let mut collections = self.collections.write().await;
        collections
            .entry(module.to_string())
            .or_default()
            .entry(signature.to_string())
            .or_insert_with(|| {
                debug!("Creating collection {}:{}", module, signature);
                Arc::new(Collection::new(module, signature))
            })
            .clone()
    }

    /// Look up an existing collection without creating one.
    pub async fn find(&self, module: &str, signature: &str) -> Option<Arc<Collection>> {
        let collections = self.collections.read().await;
        collections.get(module)?.get(signature).cloned()
    }

    /// All collections of a module.
    pub async fn collections(&self, module: &str) -> Vec<Arc<Collection>> {
        let collections = self.collections.read().await;
        collections
            .get(module)
            .map(|by_sig| by_sig.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of pooled collections.
    pub async fn len(&self) -> usize {
        let collections = self.collections.read().await;
        collections.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Flag every collection of a module stale. Returns how many.
    pub async fn expire_module(&self, module: &str) -> usize {
        let targets = self.collections(module).await;
        for collection in &targets {
            collection.expire().await;
        }
        debug!("Expired {} collections of {}", targets.len(), module);
        targets.len()
    }

    /// Merge a changed record into every collection of a module holding it.
    /// Returns the number of collections updated.
    pub async fn propagate(&self, module: &str, id: &str, patch: &Record) -> usize {
        let mut updated = 0;
        for collection in self.collections(module).await {
            if collection.merge(id, patch).await {
                updated += 1;
            }
        }
        updated
    }

    /// Drop collections nobody but the pool holds. Returns how many.
    pub async fn gc(&self) -> usize {
        let mut collections = self.collections.write().await;
        let mut removed = 0;
        for by_sig in collections.values_mut() {
            let before = by_sig.len();
            by_sig.retain(|_, c| Arc::strong_count(c) > 1 || c.is_loading());
            removed += before - by_sig.len();
        }
        collections.retain(|_, by_sig| !by_sig.is_empty());
        if removed > 0 {
            debug!("Collected {} unreferenced collections", removed);
        }
        removed
    }
}
