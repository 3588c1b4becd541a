//! Baton: per-invocation context handed to every extension.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;

/// Transient context for one invocation of a point.
///
/// Carries the caller's data, an optional typed context, and the flags
/// extensions use to steer the rest of the invocation.
#[derive(Default)]
pub struct Baton {
    /// Free-form data shared between caller and extensions.
    pub data: HashMap<String, Value>,
    context: Option<Box<dyn Any + Send + Sync>>,
    disabled: HashMap<String, HashSet<String>>,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl Baton {
    /// Create an empty baton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data value.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Attach a typed context (model, view, app handle, ...).
    pub fn with_context<T: Any + Send + Sync>(mut self, context: T) -> Self {
        self.context = Some(Box::new(context));
        self
    }

    /// Borrow the typed context, if one of type `T` is attached.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_ref().and_then(|c| c.downcast_ref::<T>())
    }

    /// Mutably borrow the typed context.
    pub fn context_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.context.as_mut().and_then(|c| c.downcast_mut::<T>())
    }

    /// Get a data value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set a data value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Skip all remaining extensions of the current invocation.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Tell the caller not to run its own default behaviour.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Suppress one extension for invocations that use this baton.
    pub fn disable(&mut self, point: impl Into<String>, id: impl Into<String>) {
        self.disabled.entry(point.into()).or_default().insert(id.into());
    }

    pub fn is_disabled(&self, point: &str, id: &str) -> bool {
        self.disabled.get(point).is_some_and(|ids| ids.contains(id))
    }
}

impl fmt::Debug for Baton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Baton")
            .field("data", &self.data)
            .field("has_context", &self.context.is_some())
            .field("disabled", &self.disabled)
            .field("propagation_stopped", &self.propagation_stopped)
            .field("default_prevented", &self.default_prevented)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MailView {
        folder: String,
    }

    #[test]
    fn test_baton_data() {
        let mut baton = Baton::new().with("folder", json!("default0/INBOX"));
        assert_eq!(baton.get("folder"), Some(&json!("default0/INBOX")));

        baton.set("count", json!(3));
        assert_eq!(baton.data.len(), 2);
    }

    #[test]
    fn test_baton_context() {
        let mut baton = Baton::new().with_context(MailView {
            folder: "INBOX".into(),
        });
        assert_eq!(baton.context::<MailView>().unwrap().folder, "INBOX");
        assert!(baton.context::<String>().is_none());

        baton.context_mut::<MailView>().unwrap().folder = "Sent".into();
        assert_eq!(baton.context::<MailView>().unwrap().folder, "Sent");
    }

    #[test]
    fn test_baton_flags() {
        let mut baton = Baton::new();
        assert!(!baton.is_propagation_stopped());
        assert!(!baton.is_default_prevented());

        baton.stop_propagation();
        baton.prevent_default();
        assert!(baton.is_propagation_stopped());
        assert!(baton.is_default_prevented());
    }

    #[test]
    fn test_baton_disable() {
        let mut baton = Baton::new();
        baton.disable("io.ox/mail/toolbar", "archive");

        assert!(baton.is_disabled("io.ox/mail/toolbar", "archive"));
        assert!(!baton.is_disabled("io.ox/mail/toolbar", "delete"));
        assert!(!baton.is_disabled("io.ox/calendar/toolbar", "archive"));
    }
}
