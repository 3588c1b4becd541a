//! Extension Point
//!
//! A named, ordered set of extensions. Entries are kept in registration
//! order; the sorted view is rebuilt lazily after every change.

use std::collections::{hash_map, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::baton::Baton;
use super::invocation::Invocation;
use super::types::*;

#[derive(Default)]
struct PointState {
    /// Registration order
    entries: Vec<Arc<Entry>>,
    /// Sorted by (index, seq); `None` when dirty
    sorted: Option<Vec<Arc<Entry>>>,
    disabled: HashSet<String>,
    /// Accepted capabilities; `None` accepts everything
    accepts: Option<HashSet<Capability>>,
    /// Patches for ids that are not registered yet
    replacements: HashMap<String, Extension>,
    next_seq: u64,
}

impl PointState {
    fn check(&self, point: &str, capability: &Capability) -> ExtensionResult<()> {
        match &self.accepts {
            Some(accepts) if !accepts.contains(capability) => {
                Err(ExtensionError::CapabilityNotSupported {
                    point: point.to_string(),
                    capability: capability.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn sorted(&mut self) -> &[Arc<Entry>] {
        let entries = &self.entries;
        self.sorted.get_or_insert_with(|| {
            let mut sorted = entries.clone();
            sorted.sort_by_key(|e| (e.index(), e.seq()));
            sorted
        })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }
}

/// Extension point
pub struct Point {
    name: String,
    state: RwLock<PointState>,
}

impl Point {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(PointState::default()),
        }
    }

    /// Point name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Restrict the capabilities entries may declare and callers may invoke.
    pub async fn accept(&self, capabilities: impl IntoIterator<Item = Capability>) {
        let mut state = self.state.write().await;
        state.accepts = Some(capabilities.into_iter().collect());
    }

    /// Register extensions.
    ///
    /// An extension whose id is already registered replaces the old entry
    /// and sorts as if newly registered. Extensions declaring a capability
    /// this point does not accept are skipped; the rest of the batch is
    /// registered and the skipped ids come back as `ExtensionError::Rejected`.
    pub async fn extend(
        &self,
        extensions: impl IntoIterator<Item = Extension>,
    ) -> ExtensionResult<&Self> {
        let extensions: Vec<Extension> = extensions.into_iter().collect();
        let mut state = self.state.write().await;

        let mut rejected = Vec::new();

        for mut ext in extensions {
            let id = ext
                .id
                .take()
                .unwrap_or_else(|| format!("ext-{}", Uuid::new_v4().simple()));

            if let Some(err) = ext
                .capabilities()
                .find_map(|c| state.check(&self.name, c).err())
            {
                warn!("Skipping {}/{}: {}", self.name, id, err);
                rejected.push(id);
                continue;
            }

            if let Some(patch) = state.replacements.remove(&id) {
                debug!("Applying pending replacement for {}/{}", self.name, id);
                ext.merge(patch);
            }

            if let Some(pos) = state.position(&id) {
                debug!("Re-registering {}/{}", self.name, id);
                state.entries.remove(pos);
            }

            let seq = state.next_seq;
            state.next_seq += 1;
            let index = ext.index.unwrap_or(DEFAULT_INDEX);
            state
                .entries
                .push(Arc::new(Entry::new(id, index, seq, ext.handlers)));
        }

        state.sorted = None;
        if !rejected.is_empty() {
            return Err(ExtensionError::Rejected {
                point: self.name.clone(),
                ids: rejected,
            });
        }
        Ok(self)
    }

    /// Patch an entry in place, keeping its registration order.
    ///
    /// When the id is not registered yet, the patch is kept and applied by
    /// the `extend` call that registers it.
    pub async fn replace(&self, patch: Extension) -> ExtensionResult<&Self> {
        let id = patch
            .id
            .clone()
            .ok_or(ExtensionError::MissingId("replace"))?;
        let mut state = self.state.write().await;

        for capability in patch.capabilities() {
            state.check(&self.name, capability)?;
        }

        match state.position(&id) {
            Some(pos) => {
                let old = &state.entries[pos];
                let mut handlers = old.handlers().clone();
                handlers.extend(patch.handlers);
                let index = patch.index.unwrap_or(old.index());
                let entry = Entry::new(id, index, old.seq(), handlers);
                state.entries[pos] = Arc::new(entry);
                state.sorted = None;
            }
            None => {
                debug!("Deferring replacement for {}/{}", self.name, id);
                match state.replacements.entry(id) {
                    hash_map::Entry::Occupied(mut pending) => pending.get_mut().merge(patch),
                    hash_map::Entry::Vacant(slot) => {
                        slot.insert(patch);
                    }
                }
            }
        }

        Ok(self)
    }

    /// Enabled entries, sorted by index then registration order.
    pub async fn list(&self) -> Vec<Arc<Entry>> {
        let mut state = self.state.write().await;
        let disabled = state.disabled.clone();
        state
            .sorted()
            .iter()
            .filter(|e| !disabled.contains(e.id()))
            .cloned()
            .collect()
    }

    /// Ids of the enabled entries, in sorted order.
    pub async fn ids(&self) -> Vec<String> {
        self.list().await.iter().map(|e| e.id().to_string()).collect()
    }

    /// Get a registered entry, enabled or not.
    pub async fn get(&self, id: &str) -> Option<Arc<Entry>> {
        let state = self.state.read().await;
        state.entries.iter().find(|e| e.id() == id).cloned()
    }

    pub async fn has(&self, id: &str) -> bool {
        self.get(id).await.is_some()
    }

    /// Number of registered entries, including disabled ones.
    pub async fn count(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Hide an entry from `list` and `invoke` without removing it.
    pub async fn disable(&self, id: impl Into<String>) -> &Self {
        self.state.write().await.disabled.insert(id.into());
        self
    }

    pub async fn enable(&self, id: &str) -> &Self {
        self.state.write().await.disabled.remove(id);
        self
    }

    pub async fn is_enabled(&self, id: &str) -> bool {
        !self.state.read().await.disabled.contains(id)
    }

    /// Call `capability` on every enabled entry that implements it.
    ///
    /// Entries run in sorted order against a snapshot taken up front, so a
    /// handler may extend this point; the new entry is seen by the next
    /// call. Iteration ends once the baton's propagation is stopped. A
    /// handler error aborts the invocation and is returned as is.
    pub async fn invoke(
        &self,
        capability: &Capability,
        baton: &mut Baton,
    ) -> ExtensionResult<Invocation> {
        self.state.read().await.check(&self.name, capability)?;

        let snapshot = self.list().await;
        let mut invocation = Invocation::new(&self.name, capability.clone());

        for entry in snapshot {
            if baton.is_propagation_stopped() {
                debug!("Propagation stopped at {}/{}", self.name, entry.id());
                break;
            }
            if baton.is_disabled(&self.name, entry.id()) {
                continue;
            }
            let Some(handler) = entry.handler(capability) else {
                continue;
            };

            let outcome = handler(&*entry, &mut *baton)?;
            invocation.push(entry.id(), outcome);
        }

        Ok(invocation)
    }

    /// Remove every entry, disabled id and pending replacement.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.sorted = None;
        state.disabled.clear();
        state.replacements.clear();
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Point").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(id: &str, index: i64) -> Extension {
        let tag = id.to_string();
        Extension::new(id)
            .index(index)
            .draw(move |_, _| Ok(Outcome::Value(json!(tag.clone()))))
    }

    #[tokio::test]
    async fn test_list_sorted_by_index() {
        let point = Point::new("io.ox/mail/detail");
        point
            .extend([named("c", 300), named("a", 100), named("b", 200)])
            .await
            .unwrap();

        assert_eq!(point.ids().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_ties_keep_registration_order() {
        let point = Point::new("p");
        point.extend([named("first", 100)]).await.unwrap();
        point.extend([named("second", 100)]).await.unwrap();
        point.extend([named("zero", 0)]).await.unwrap();

        assert_eq!(point.ids().await, vec!["zero", "first", "second"]);
    }

    #[tokio::test]
    async fn test_missing_index_and_id_defaults() {
        let point = Point::new("p");
        point
            .extend([Extension::anonymous().draw(|_, _| Ok(Outcome::Done))])
            .await
            .unwrap();

        let entries = point.list().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index(), DEFAULT_INDEX);
        assert!(entries[0].id().starts_with("ext-"));
    }

    #[tokio::test]
    async fn test_reregister_repositions() {
        let point = Point::new("p");
        point
            .extend([named("a", 100), named("b", 200), named("c", 300)])
            .await
            .unwrap();
        point.extend([named("a", 250)]).await.unwrap();

        assert_eq!(point.count().await, 3);
        assert_eq!(point.ids().await, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_disable_enable_round_trip() {
        let point = Point::new("p");
        point
            .extend([named("a", 100), named("b", 200), named("c", 300)])
            .await
            .unwrap();

        point.disable("b").await;
        assert!(!point.is_enabled("b").await);
        assert_eq!(point.ids().await, vec!["a", "c"]);

        let invocation = point
            .invoke(&Capability::Draw, &mut Baton::new())
            .await
            .unwrap();
        assert_eq!(invocation.ids(), vec!["a", "c"]);

        point.enable("b").await;
        assert_eq!(point.ids().await, vec!["a", "b", "c"]);
        assert!(point.has("b").await);
    }

    #[tokio::test]
    async fn test_invoke_skips_entries_without_capability() {
        let point = Point::new("p");
        point
            .extend([
                named("a", 100),
                Extension::new("validator")
                    .index(50)
                    .on(Capability::Validate, |_, _| Ok(Outcome::Value(json!(true)))),
            ])
            .await
            .unwrap();

        let invocation = point
            .invoke(&Capability::Draw, &mut Baton::new())
            .await
            .unwrap();
        assert_eq!(invocation.ids(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_stop_propagation() {
        let point = Point::new("p");
        point
            .extend([
                named("a", 100),
                Extension::new("stopper").index(150).draw(|_, baton| {
                    baton.stop_propagation();
                    Ok(Outcome::Done)
                }),
                named("c", 200),
            ])
            .await
            .unwrap();

        let mut baton = Baton::new();
        let invocation = point.invoke(&Capability::Draw, &mut baton).await.unwrap();
        assert_eq!(invocation.ids(), vec!["a", "stopper"]);
        assert!(baton.is_propagation_stopped());

        // per-call only: a fresh baton runs everything again
        let invocation = point
            .invoke(&Capability::Draw, &mut Baton::new())
            .await
            .unwrap();
        assert_eq!(invocation.len(), 2);
        assert_eq!(point.count().await, 3);
    }

    #[tokio::test]
    async fn test_baton_disable_is_per_call() {
        let point = Point::new("io.ox/mail/toolbar");
        point.extend([named("a", 1), named("b", 2)]).await.unwrap();

        let mut baton = Baton::new();
        baton.disable("io.ox/mail/toolbar", "a");
        let invocation = point.invoke(&Capability::Draw, &mut baton).await.unwrap();
        assert_eq!(invocation.ids(), vec!["b"]);
        assert!(point.is_enabled("a").await);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let point = Point::new("p");
        point
            .extend([
                Extension::new("broken")
                    .index(1)
                    .draw(|entry, _| Err(ExtensionError::failed(entry.id(), "boom"))),
                named("after", 2),
            ])
            .await
            .unwrap();

        let err = point
            .invoke(&Capability::Draw, &mut Baton::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtensionError::Failed { ref id, .. } if id == "broken"));
    }

    #[tokio::test]
    async fn test_handler_sees_baton_data_and_entry() {
        let point = Point::new("p");
        point
            .extend([Extension::new("greeter").index(7).draw(|entry, baton| {
                let name = baton.get("name").and_then(|v| v.as_str()).unwrap_or("?");
                let text = format!("{}@{}: hello {}", entry.id(), entry.index(), name);
                baton.set("drawn", json!(true));
                Ok(Outcome::Value(json!(text)))
            })])
            .await
            .unwrap();

        let mut baton = Baton::new().with("name", json!("Ada"));
        let values = point
            .invoke(&Capability::Draw, &mut baton)
            .await
            .unwrap()
            .values()
            .await
            .unwrap();

        assert_eq!(values, vec![json!("greeter@7: hello Ada")]);
        assert_eq!(baton.get("drawn"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_accept_skips_only_unsupported_entries() {
        let point = Point::new("io.ox/core/settings");
        point.accept([Capability::Draw]).await;

        let err = point
            .extend([
                named("ok", 1),
                Extension::new("bad").on(Capability::Validate, |_, _| Ok(Outcome::Done)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ExtensionError::Rejected { ref ids, .. } if ids == &["bad"]));
        assert!(point.has("ok").await);
        assert!(!point.has("bad").await);
        assert_eq!(point.count().await, 1);

        let err = point
            .invoke(&Capability::Validate, &mut Baton::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtensionError::CapabilityNotSupported { .. }));
    }

    #[tokio::test]
    async fn test_replace_existing_keeps_order() {
        let point = Point::new("p");
        point
            .extend([named("a", 100), named("b", 100), named("c", 100)])
            .await
            .unwrap();

        point
            .replace(Extension::new("a").draw(|_, _| Ok(Outcome::Value(json!("patched")))))
            .await
            .unwrap();

        assert_eq!(point.ids().await, vec!["a", "b", "c"]);
        let values = point
            .invoke(&Capability::Draw, &mut Baton::new())
            .await
            .unwrap()
            .values()
            .await
            .unwrap();
        assert_eq!(values[0], json!("patched"));

        point.replace(Extension::new("a").index(500)).await.unwrap();
        assert_eq!(point.ids().await, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_replace_before_registration() {
        let point = Point::new("p");
        point.replace(Extension::new("late").index(1)).await.unwrap();
        assert!(!point.has("late").await);

        point.extend([named("early", 50), named("late", 100)]).await.unwrap();
        assert_eq!(point.ids().await, vec!["late", "early"]);

        assert!(matches!(
            point.replace(Extension::anonymous()).await,
            Err(ExtensionError::MissingId(_))
        ));
    }

    #[tokio::test]
    async fn test_extend_during_invoke() {
        let point = Arc::new(Point::new("p"));
        let inner = point.clone();
        point
            .extend([Extension::new("spawner").draw(move |_, _| {
                let inner = inner.clone();
                Ok(Outcome::pending(async move {
                    inner.extend([named("spawned", 1)]).await?;
                    Ok(json!("spawned"))
                }))
            })])
            .await
            .unwrap();

        let invocation = point
            .invoke(&Capability::Draw, &mut Baton::new())
            .await
            .unwrap();
        assert_eq!(invocation.len(), 1);
        invocation.settle().await;

        // visible on the next invocation
        assert_eq!(point.ids().await, vec!["spawned", "spawner"]);
    }

    #[tokio::test]
    async fn test_clear() {
        let point = Point::new("p");
        point.extend([named("a", 1)]).await.unwrap();
        point.disable("a").await;
        point.clear().await;

        assert_eq!(point.count().await, 0);
        assert!(point.is_enabled("a").await);
        assert!(point.list().await.is_empty());
    }
}
