//! Collection events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Loader operation that triggered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Initial load, replaces contents
    Load,
    /// Next page, appends
    Paginate,
    /// Refresh of the loaded window, replaces contents
    Reload,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Load => write!(f, "load"),
            Operation::Paginate => write!(f, "paginate"),
            Operation::Reload => write!(f, "reload"),
        }
    }
}

/// Event published on a collection's broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A network fetch for the operation is about to start
    Before(Operation),
    /// Contents were replaced (also re-sent on a cache hit)
    Reset,
    /// Records were appended
    Add { count: usize },
    /// A record was removed
    Remove { id: String },
    /// The operation finished successfully
    Loaded(Operation),
    /// A page came back empty: there is nothing more to paginate
    Complete,
    /// The operation's fetch failed
    Failed { operation: Operation, error: String },
    /// The collection was flagged stale
    Expired,
}

impl CollectionEvent {
    /// Event name: `load`, `before:paginate`, `reload:fail`, `complete`, ...
    pub fn name(&self) -> String {
        match self {
            CollectionEvent::Before(op) => format!("before:{}", op),
            CollectionEvent::Reset => "reset".to_string(),
            CollectionEvent::Add { .. } => "add".to_string(),
            CollectionEvent::Remove { .. } => "remove".to_string(),
            CollectionEvent::Loaded(op) => op.to_string(),
            CollectionEvent::Complete => "complete".to_string(),
            CollectionEvent::Failed { operation, .. } => format!("{}:fail", operation),
            CollectionEvent::Expired => "expire".to_string(),
        }
    }
}
