//! Pooled collection of list records.

use std::sync::atomic::{AtomicUsize, Ordering};

use ox_core::Record;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use super::events::CollectionEvent;

/// Capacity of each collection's event channel
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct CollectionState {
    records: Vec<Record>,
    expired: bool,
}

/// Ordered records for one `(module, signature)` pair.
///
/// Shared by every holder of the `Arc`; mutations are visible to all of
/// them (last writer wins).
#[derive(Debug)]
pub struct Collection {
    module: String,
    signature: String,
    state: RwLock<CollectionState>,
    /// Fetches in flight into this collection
    loading: AtomicUsize,
    events: broadcast::Sender<CollectionEvent>,
}

/// Identity of a record: its `id` field rendered as a string.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl Collection {
    /// Create an empty collection
    pub fn new(module: impl Into<String>, signature: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            module: module.into(),
            signature: signature.into(),
            state: RwLock::new(CollectionState::default()),
            loading: AtomicUsize::new(0),
            events,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    /// Publish an event; dropped when nobody listens.
    pub fn emit(&self, event: CollectionEvent) {
        let _ = self.events.send(event);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of all records.
    pub async fn records(&self) -> Vec<Record> {
        self.state.read().await.records.clone()
    }

    /// Record at a position.
    pub async fn get(&self, position: usize) -> Option<Record> {
        self.state.read().await.records.get(position).cloned()
    }

    /// Record with the given id.
    pub async fn find(&self, id: &str) -> Option<Record> {
        let state = self.state.read().await;
        state
            .records
            .iter()
            .find(|r| record_id(r).as_deref() == Some(id))
            .cloned()
    }

    /// Replace all records. Fresh contents clear the expired flag.
    pub async fn reset(&self, records: Vec<Record>) {
        {
            let mut state = self.state.write().await;
            state.records = records;
            state.expired = false;
        }
        self.emit(CollectionEvent::Reset);
    }

    /// Append records. A record whose id is already present is merged into
    /// the existing one instead of being appended again.
    ///
    /// Returns the number of records actually appended.
    pub async fn add(&self, records: Vec<Record>) -> usize {
        let added = {
            let mut state = self.state.write().await;
            let mut added = 0;
            for record in records {
                let existing = record_id(&record).and_then(|id| {
                    state
                        .records
                        .iter()
                        .position(|r| record_id(r).as_deref() == Some(id.as_str()))
                });
                match existing {
                    Some(pos) => state.records[pos].extend(record),
                    None => {
                        state.records.push(record);
                        added += 1;
                    }
                }
            }
            added
        };
        self.emit(CollectionEvent::Add { count: added });
        added
    }

    /// Remove the record with the given id.
    pub async fn remove(&self, id: &str) -> Option<Record> {
        let removed = {
            let mut state = self.state.write().await;
            let pos = state
                .records
                .iter()
                .position(|r| record_id(r).as_deref() == Some(id))?;
            state.records.remove(pos)
        };
        self.emit(CollectionEvent::Remove { id: id.to_string() });
        Some(removed)
    }

    /// Merge fields into the record with the given id.
    pub async fn merge(&self, id: &str, patch: &Record) -> bool {
        let mut state = self.state.write().await;
        match state
            .records
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
        {
            Some(record) => {
                record.extend(patch.clone());
                true
            }
            None => false,
        }
    }

    /// Flag the collection stale: the next loader call goes to the network.
    pub async fn expire(&self) {
        self.state.write().await.expired = true;
        self.emit(CollectionEvent::Expired);
    }

    pub async fn is_expired(&self) -> bool {
        self.state.read().await.expired
    }

    /// Whether a fetch into this collection is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Claim the collection for a fetch; false if one is in flight.
    pub(crate) fn try_begin_loading(&self) -> bool {
        self.loading
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Register a fetch regardless of others in flight.
    pub(crate) fn begin_loading(&self) {
        self.loading.fetch_add(1, Ordering::SeqCst);
    }

    /// Must pair with a successful `try_begin_loading` or a `begin_loading`.
    pub(crate) fn end_loading(&self) {
        self.loading.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_reset_clears_expired() {
        let collection = Collection::new("mail", "default");
        collection.expire().await;
        assert!(collection.is_expired().await);

        collection.reset(vec![record(json!({"id": "1"}))]).await;
        assert!(!collection.is_expired().await);
        assert_eq!(collection.len().await, 1);
    }

    #[tokio::test]
    async fn test_add_merges_by_id() {
        let collection = Collection::new("mail", "default");
        collection
            .reset(vec![record(json!({"id": "1", "subject": "old"}))])
            .await;

        let added = collection
            .add(vec![
                record(json!({"id": "1", "subject": "new"})),
                record(json!({"id": 2})),
                record(json!({"subject": "no id"})),
            ])
            .await;

        assert_eq!(added, 2);
        assert_eq!(collection.len().await, 3);
        assert_eq!(collection.find("1").await.unwrap()["subject"], json!("new"));
        assert!(collection.find("2").await.is_some());
    }

    #[tokio::test]
    async fn test_remove_and_merge() {
        let collection = Collection::new("contacts", "folder=6");
        collection
            .reset(vec![record(json!({"id": "a"})), record(json!({"id": "b"}))])
            .await;
        let mut events = collection.subscribe();

        assert!(collection.remove("a").await.is_some());
        assert!(collection.remove("a").await.is_none());
        assert_eq!(
            events.try_recv().unwrap(),
            CollectionEvent::Remove { id: "a".into() }
        );

        let patch = record(json!({"display_name": "Ada"}));
        assert!(collection.merge("b", &patch).await);
        assert!(!collection.merge("zzz", &patch).await);
        assert_eq!(collection.get(0).await.unwrap()["display_name"], json!("Ada"));
    }

    #[test]
    fn test_loading_flag() {
        let collection = Collection::new("tasks", "default");
        assert!(collection.try_begin_loading());
        assert!(!collection.try_begin_loading());
        assert!(collection.is_loading());
        collection.end_loading();
        assert!(!collection.is_loading());
    }

    #[test]
    fn test_loading_counts_overlapping_fetches() {
        let collection = Collection::new("tasks", "default");
        collection.begin_loading();
        collection.begin_loading();
        assert!(!collection.try_begin_loading());

        collection.end_loading();
        assert!(collection.is_loading());
        assert!(!collection.try_begin_loading());

        collection.end_loading();
        assert!(!collection.is_loading());
        assert!(collection.try_begin_loading());
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record_id(&record(json!({"id": "x"}))), Some("x".into()));
        assert_eq!(record_id(&record(json!({"id": 42}))), Some("42".into()));
        assert_eq!(record_id(&record(json!({"id": null}))), None);
        assert_eq!(record_id(&record(json!({}))), None);
    }
}
