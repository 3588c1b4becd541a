//! Rampup cache: list responses pushed by the server at startup.
//!
//! Each entry answers exactly one request. The first lookup for a key
//! removes it, later lookups for the same key go to the network.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::types::{encode_query, parse_records, QueryParams, Record};

/// One-shot cache of pre-fetched list responses.
#[derive(Debug, Default)]
pub struct RampupCache {
    entries: Mutex<HashMap<String, Vec<Record>>>,
}

impl RampupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the cache key `<module>/<urlencoded params>&session=<id>`.
    pub fn key_for(module: &str, params: &QueryParams, session: &str) -> String {
        format!("{}/{}&session={}", module, encode_query(params), session)
    }

    /// Store records under a key, replacing any previous entry.
    pub async fn insert(&self, key: impl Into<String>, records: Vec<Record>) {
        self.entries.lock().await.insert(key.into(), records);
    }

    /// Load a server-pushed map of `key -> [records]`.
    ///
    /// Returns the number of entries added.
    pub async fn load_json(&self, value: Value) -> Result<usize> {
        let Value::Object(map) = value else {
            return Ok(0);
        };

        let mut entries = self.entries.lock().await;
        let mut added = 0;
        for (key, body) in map {
            let records = parse_records(&key, body)?;
            entries.insert(key, records);
            added += 1;
        }
        debug!("Loaded {} rampup entries", added);
        Ok(added)
    }

    /// Remove and return the entry for a key.
    pub async fn take(&self, key: &str) -> Option<Vec<Record>> {
        let hit = self.entries.lock().await.remove(key);
        if hit.is_some() {
            debug!("Rampup hit: {}", key);
        }
        hit
    }

    /// Number of entries not consumed yet.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether all entries have been consumed.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
