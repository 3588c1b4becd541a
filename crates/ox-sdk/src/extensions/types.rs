//! Extension Type Definitions

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::baton::Baton;

/// Sort key assigned to extensions registered without an index.
pub const DEFAULT_INDEX: i64 = 100;

/// Extension error types
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension id is required for {0}")]
    MissingId(&'static str),

    #[error("Capability not supported by point {point}: {capability}")]
    CapabilityNotSupported { point: String, capability: Capability },

    #[error("Extensions rejected by point {point}: {}", ids.join(", "))]
    Rejected { point: String, ids: Vec<String> },

    #[error("Extension {id} failed: {message}")]
    Failed { id: String, message: String },
}

impl ExtensionError {
    /// Create a failure raised by an extension handler
    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            id: id.into(),
            message: message.into(),
        }
    }
}

pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Kind of invocation an extension can answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Render into the baton
    Draw,
    /// Run a user-triggered action
    Action,
    /// Validate the data carried by the baton
    Validate,
    /// Enrich data before it is used
    Enhance,
    /// Adjust defaults before drawing
    Customize,
    /// Produce a rendered value
    Render,
    /// Point-specific invocation kind
    Named(String),
}

impl Capability {
    /// Create a point-specific capability
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Draw => write!(f, "draw"),
            Capability::Action => write!(f, "action"),
            Capability::Validate => write!(f, "validate"),
            Capability::Enhance => write!(f, "enhance"),
            Capability::Customize => write!(f, "customize"),
            Capability::Render => write!(f, "render"),
            Capability::Named(name) => write!(f, "{}", name),
        }
    }
}

/// What a handler produced for one invocation.
pub enum Outcome {
    /// Nothing to report
    Done,
    /// A value available right away
    Value(Value),
    /// Work that settles later; awaited by `Invocation::settle`
    Pending(BoxFuture<'static, ExtensionResult<Value>>),
}

impl Outcome {
    /// Wrap a future as a pending outcome
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = ExtensionResult<Value>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }

    /// Whether the outcome still has to be awaited
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => write!(f, "Done"),
            Outcome::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Outcome::Pending(_) => write!(f, "Pending(..)"),
        }
    }
}

/// Capability function. Receives the invoked entry and the caller's baton.
pub type Handler = Arc<dyn Fn(&Entry, &mut Baton) -> ExtensionResult<Outcome> + Send + Sync>;

/// An extension as contributed by a module, before registration.
///
/// Missing index and id are filled in by `Point::extend`.
#[derive(Clone, Default)]
pub struct Extension {
    pub(crate) id: Option<String>,
    pub(crate) index: Option<i64>,
    pub(crate) handlers: HashMap<Capability, Handler>,
}

impl Extension {
    /// Create an extension with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Create an extension whose id is generated on registration
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Set the sort index
    pub fn index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Register a handler for a capability
    pub fn on<F>(mut self, capability: Capability, handler: F) -> Self
    where
        F: Fn(&Entry, &mut Baton) -> ExtensionResult<Outcome> + Send + Sync + 'static,
    {
        self.handlers.insert(capability, Arc::new(handler));
        self
    }

    /// Shorthand for `on(Capability::Draw, ..)`
    pub fn draw<F>(self, handler: F) -> Self
    where
        F: Fn(&Entry, &mut Baton) -> ExtensionResult<Outcome> + Send + Sync + 'static,
    {
        self.on(Capability::Draw, handler)
    }

    /// The id, if one was given
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Capabilities this extension answers
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.handlers.keys()
    }

    /// Fold a later patch into this extension: the patch's index wins when
    /// set, its handlers override ours per capability.
    pub(crate) fn merge(&mut self, patch: Extension) {
        if patch.index.is_some() {
            self.index = patch.index;
        }
        self.handlers.extend(patch.handlers);
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("capabilities", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A registered extension.
pub struct Entry {
    id: String,
    index: i64,
    seq: u64,
    handlers: HashMap<Capability, Handler>,
}

impl Entry {
    pub(crate) fn new(id: String, index: i64, seq: u64, handlers: HashMap<Capability, Handler>) -> Self {
        Self {
            id,
            index,
            seq,
            handlers,
        }
    }

    /// Unique id within the point
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sort index
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Registration sequence, breaks index ties
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether this entry answers the capability
    pub fn handles(&self, capability: &Capability) -> bool {
        self.handlers.contains_key(capability)
    }

    /// Capabilities this entry answers
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.handlers.keys()
    }

    pub(crate) fn handler(&self, capability: &Capability) -> Option<&Handler> {
        self.handlers.get(capability)
    }

    pub(crate) fn handlers(&self) -> &HashMap<Capability, Handler> {
        &self.handlers
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("seq", &self.seq)
            .field("capabilities", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_display() {
        assert_eq!(Capability::Draw.to_string(), "draw");
        assert_eq!(Capability::named("toolbar").to_string(), "toolbar");
    }

    #[test]
    fn test_extension_merge() {
        let mut ext = Extension::new("a")
            .index(10)
            .draw(|_, _| Ok(Outcome::Done));
        ext.merge(Extension::new("a").on(Capability::Validate, |_, _| Ok(Outcome::Done)));

        assert_eq!(ext.index, Some(10));
        assert_eq!(ext.capabilities().count(), 2);

        ext.merge(Extension::new("a").index(5));
        assert_eq!(ext.index, Some(5));
    }

    #[test]
    fn test_rejected_lists_ids() {
        let err = ExtensionError::Rejected {
            point: "io.ox/mail/detail".into(),
            ids: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "Extensions rejected by point io.ox/mail/detail: a, b"
        );
    }

    #[test]
    fn test_outcome_debug() {
        assert_eq!(format!("{:?}", Outcome::Done), "Done");
        let pending = Outcome::pending(async { Ok(Value::Null) });
        assert!(pending.is_pending());
        assert_eq!(format!("{:?}", pending), "Pending(..)");
    }
}
