//! In-memory transport for loader tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ox_core::{Error, QueryParams, Record, Result, Transport};
use serde_json::json;
use tokio::sync::{broadcast, watch, Semaphore};

use super::events::CollectionEvent;

/// Serves slices of a fixed record list, honouring `limit=start,end`.
///
/// A gated transport parks every request until `release` hands out a
/// permit, so tests can hold a fetch in flight.
pub(crate) struct MockTransport {
    records: Mutex<Vec<Record>>,
    failing: AtomicBool,
    gate: Option<Semaphore>,
    requests: Mutex<Vec<QueryParams>>,
    received: watch::Sender<usize>,
}

impl MockTransport {
    /// Records with ids `A`, `B`, `C`, ...
    pub(crate) fn with_records(count: usize) -> Self {
        let records = (0..count)
            .map(|i| {
                let id = char::from(b'A' + (i % 26) as u8).to_string();
                json!({"id": id, "subject": format!("message {}", i)})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect();
        let (received, _) = watch::channel(0);
        Self {
            records: Mutex::new(records),
            failing: AtomicBool::new(false),
            gate: None,
            requests: Mutex::new(Vec::new()),
            received,
        }
    }

    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let `n` parked requests through.
    pub(crate) fn release(&self, n: usize) {
        if let Some(ref gate) = self.gate {
            gate.add_permits(n);
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Drop records from the backend beyond `len`.
    pub(crate) fn truncate(&self, len: usize) {
        self.records.lock().unwrap().truncate(len);
    }

    pub(crate) fn requests(&self) -> Vec<QueryParams> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Wait until at least `n` requests reached the transport.
    pub(crate) async fn wait_for_requests(&self, n: usize) {
        let mut rx = self.received.subscribe();
        rx.wait_for(|count| *count >= n).await.unwrap();
    }
}

fn parse_limit(params: &QueryParams) -> (usize, usize) {
    let limit = params.get("limit").map(String::as_str).unwrap_or("0,0");
    let (start, end) = limit.split_once(',').unwrap_or(("0", limit));
    (start.parse().unwrap_or(0), end.parse().unwrap_or(0))
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, _module: &str, params: &QueryParams) -> Result<Vec<Record>> {
        self.requests.lock().unwrap().push(params.clone());
        self.received.send_modify(|count| *count += 1);

        if let Some(ref gate) = self.gate {
            gate.acquire()
                .await
                .map_err(|e| Error::Other(e.to_string()))?
                .forget();
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Api {
                status: 500,
                body: "backend down".into(),
            });
        }

        let records = self.records.lock().unwrap();
        let (start, end) = parse_limit(params);
        let start = start.min(records.len());
        let end = end.clamp(start, records.len());
        Ok(records[start..end].to_vec())
    }
}

/// Everything published on a receiver so far.
pub(crate) fn drain(rx: &mut broadcast::Receiver<CollectionEvent>) -> Vec<CollectionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
