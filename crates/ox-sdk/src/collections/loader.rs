//! Collection Loader
//!
//! Turns a paged list endpoint into a pooled, incrementally growing
//! collection.
//!
//! # State machine
//!
//! `idle -> loading -> idle`. `load` always runs; `paginate` and `reload`
//! return the collection untouched while a fetch of this loader, or any
//! fetch into the target collection, is in flight. Loader and collection
//! each count their fetches in flight; a drop guard releases exactly what
//! it claimed, so a failed fetch never wedges the loader.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ox_core::{format_limit, QueryParams, RampupCache, Record, Transport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::collection::Collection;
use super::events::{CollectionEvent, Operation};
use super::pool::CollectionPool;
use super::signature::signature;

/// Default page size
pub const DEFAULT_LIMIT: usize = 50;

/// Static loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Backend module name, also the pool namespace
    pub module: String,

    /// Column projection sent as `columns`
    pub columns: Option<String>,

    /// Keys dropped when computing the signature (default: `limit`)
    pub ignore: Vec<String>,

    /// Page size. Zero is treated as 1.
    pub limit: usize,

    /// Parameters sent with every request (e.g. `action=all`)
    pub params: QueryParams,
}

impl LoaderConfig {
    /// Create a config for a module with default paging
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            columns: None,
            ignore: vec!["limit".to_string()],
            limit: DEFAULT_LIMIT,
            params: QueryParams::new(),
        }
    }

    /// Set the column projection
    pub fn with_columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Set the page size (at least 1)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Add a key ignored by the signature
    pub fn ignore(mut self, key: impl Into<String>) -> Self {
        self.ignore.push(key.into());
        self
    }

    /// Add a parameter sent with every request
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Customisation points of a loader.
///
/// `query_params` shapes both the request and the signature. The other
/// hooks run around index tagging of every freshly fetched page.
pub trait LoaderHooks: Send + Sync {
    /// Canonical parameters for a caller's params. Default: none.
    fn query_params(&self, _params: &QueryParams) -> QueryParams {
        QueryParams::new()
    }

    /// Before any record of the page is tagged.
    fn before(&self, _offset: usize, _params: &QueryParams, _data: &mut Vec<Record>) {}

    /// After `record` got its `index`; `index` here is its position in the page.
    fn each(&self, _record: &mut Record, _index: usize, _offset: usize, _params: &QueryParams) {}

    /// After every record of the page is tagged.
    fn after(&self, _offset: usize, _params: &QueryParams, _data: &mut Vec<Record>) {}
}

/// Hooks with all defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl LoaderHooks for DefaultHooks {}

/// Hooks that forward the caller's params unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl LoaderHooks for Passthrough {
    fn query_params(&self, params: &QueryParams) -> QueryParams {
        params.clone()
    }
}

/// One fetch counted against the loader and the collection.
struct LoadingGuard<'a> {
    loader: &'a AtomicUsize,
    collection: Arc<Collection>,
}

impl<'a> LoadingGuard<'a> {
    /// Unconditional claim, used by `load`.
    fn acquire(loader: &'a AtomicUsize, collection: Arc<Collection>) -> Self {
        loader.fetch_add(1, Ordering::SeqCst);
        collection.begin_loading();
        Self { loader, collection }
    }

    /// Claim only if neither the loader nor the collection has a fetch in flight.
    fn try_acquire(loader: &'a AtomicUsize, collection: Arc<Collection>) -> Option<Self> {
        if loader
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        if !collection.try_begin_loading() {
            loader.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(Self { loader, collection })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.loader.fetch_sub(1, Ordering::SeqCst);
        self.collection.end_loading();
    }
}

/// Paginating loader bound to one backend module
pub struct CollectionLoader {
    config: LoaderConfig,
    hooks: Arc<dyn LoaderHooks>,
    pool: Arc<CollectionPool>,
    transport: Arc<dyn Transport>,
    rampup: Option<Arc<RampupCache>>,
    session: String,
    /// Fetches in flight
    loading: AtomicUsize,
}

impl CollectionLoader {
    /// Create a loader with default hooks
    pub fn new(
        config: LoaderConfig,
        pool: Arc<CollectionPool>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            hooks: Arc::new(DefaultHooks),
            pool,
            transport,
            rampup: None,
            session: String::new(),
            loading: AtomicUsize::new(0),
        }
    }

    /// Replace the hooks
    pub fn with_hooks(mut self, hooks: Arc<dyn LoaderHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Consult a rampup cache before going to the network
    pub fn with_rampup(mut self, rampup: Arc<RampupCache>, session: impl Into<String>) -> Self {
        self.rampup = Some(rampup);
        self.session = session.into();
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<CollectionPool> {
        &self.pool
    }

    /// Whether a fetch of this loader is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Page size, never zero
    fn page_size(&self) -> usize {
        self.config.limit.max(1)
    }

    /// Query signature for the caller's params
    pub fn signature_for(&self, params: &QueryParams) -> String {
        signature(&self.hooks.query_params(params), &self.config.ignore)
    }

    /// Pooled collection for the caller's params
    pub async fn collection_for(&self, params: &QueryParams) -> Arc<Collection> {
        let sig = self.signature_for(params);
        self.pool.get(&self.config.module, &sig).await
    }

    /// Load the first page into the collection for `params`.
    ///
    /// A non-empty, non-expired collection is served from memory and no
    /// request is made. `Reset` and `Loaded(Load)` are re-emitted from a
    /// spawned task, so they reach receivers subscribed to the returned
    /// collection once the caller yields.
    ///
    /// A fetch emits its events before returning; subscribe through
    /// [`collection_for`](Self::collection_for) first to observe them.
    pub async fn load(&self, params: &QueryParams) -> Arc<Collection> {
        let collection = self.collection_for(params).await;

        if !collection.is_empty().await && !collection.is_expired().await {
            debug!("Cache hit for {}:{}", self.config.module, collection.signature());
            let cached = collection.clone();
            tokio::spawn(async move {
                cached.emit(CollectionEvent::Reset);
                cached.emit(CollectionEvent::Loaded(Operation::Load));
            });
            return collection;
        }

        let _guard = LoadingGuard::acquire(&self.loading, collection.clone());
        collection.emit(CollectionEvent::Before(Operation::Load));

        match self.fetch(params, 0, self.page_size()).await {
            Ok(mut data) => {
                self.process(&mut data, 0, params);
                collection.reset(data).await;
                collection.emit(CollectionEvent::Loaded(Operation::Load));
            }
            Err(e) => self.fail(&collection, Operation::Load, e),
        }

        collection
    }

    /// Append the next page. Emits `Complete` when the page is empty.
    ///
    /// An expired collection is loaded from the start instead.
    pub async fn paginate(&self, params: &QueryParams) -> Arc<Collection> {
        let collection = self.collection_for(params).await;

        if self.is_loading() || collection.is_loading() {
            debug!("Paginate skipped, fetch in flight for {}", self.config.module);
            return collection;
        }
        if collection.is_expired().await {
            return self.load(params).await;
        }

        let Some(_guard) = LoadingGuard::try_acquire(&self.loading, collection.clone()) else {
            return collection;
        };

        let offset = collection.len().await;
        collection.emit(CollectionEvent::Before(Operation::Paginate));

        let end = offset.saturating_add(self.page_size());
        match self.fetch(params, offset, end).await {
            Ok(mut data) => {
                if data.is_empty() {
                    debug!("End of list for {}:{}", self.config.module, collection.signature());
                    collection.emit(CollectionEvent::Complete);
                } else {
                    self.process(&mut data, offset, params);
                    collection.add(data).await;
                }
                collection.emit(CollectionEvent::Loaded(Operation::Paginate));
            }
            Err(e) => self.fail(&collection, Operation::Paginate, e),
        }

        collection
    }

    /// Re-fetch the loaded window, at least one page, and replace contents.
    pub async fn reload(&self, params: &QueryParams) -> Arc<Collection> {
        let collection = self.collection_for(params).await;

        let Some(_guard) = LoadingGuard::try_acquire(&self.loading, collection.clone()) else {
            debug!("Reload skipped, fetch in flight for {}", self.config.module);
            return collection;
        };

        let end = collection.len().await.max(self.page_size());
        collection.emit(CollectionEvent::Before(Operation::Reload));

        match self.fetch(params, 0, end).await {
            Ok(mut data) => {
                self.process(&mut data, 0, params);
                collection.reset(data).await;
                collection.emit(CollectionEvent::Loaded(Operation::Reload));
            }
            Err(e) => self.fail(&collection, Operation::Reload, e),
        }

        collection
    }

    /// Fetch records `[start, end)` for `params`.
    ///
    /// A matching rampup entry is consumed instead of issuing a request.
    pub async fn fetch(
        &self,
        params: &QueryParams,
        start: usize,
        end: usize,
    ) -> ox_core::Result<Vec<Record>> {
        let request = self.request_params(params, start, end);

        if let Some(ref rampup) = self.rampup {
            let key = RampupCache::key_for(&self.config.module, &request, &self.session);
            if let Some(records) = rampup.take(&key).await {
                return Ok(records);
            }
        }

        self.transport.get(&self.config.module, &request).await
    }

    /// Full request parameters: static params, query params, columns, limit.
    pub fn request_params(&self, params: &QueryParams, start: usize, end: usize) -> QueryParams {
        let mut request = self.config.params.clone();
        request.extend(self.hooks.query_params(params));
        if let Some(ref columns) = self.config.columns {
            request
                .entry("columns".to_string())
                .or_insert_with(|| columns.clone());
        }
        request.insert("limit".to_string(), format_limit(start, end));
        request
    }

    fn process(&self, data: &mut Vec<Record>, offset: usize, params: &QueryParams) {
        self.hooks.before(offset, params, data);
        for (i, record) in data.iter_mut().enumerate() {
            record.insert("index".to_string(), Value::from(offset + i));
            self.hooks.each(record, i, offset, params);
        }
        self.hooks.after(offset, params, data);
    }

    fn fail(&self, collection: &Collection, operation: Operation, error: ox_core::Error) {
        warn!(
            "{} failed for {}:{}: {}",
            operation,
            self.config.module,
            collection.signature(),
            error
        );
        collection.emit(CollectionEvent::Failed {
            operation,
            error: error.to_string(),
        });
    }
}
