//! Extension System
//!
//! Named extension points that independently loaded modules contribute
//! behaviour to, without the point knowing its contributors up front.
//!
//! # Example
//!
//! ```rust
//! use ox_sdk::extensions::{Baton, Capability, Extension, ExtensionRegistry, Outcome};
//! use serde_json::json;
//!
//! # async fn example() -> ox_sdk::extensions::ExtensionResult<()> {
//! let registry = ExtensionRegistry::new();
//! let point = registry.point("io.ox/mail/detail/header").await;
//!
//! point
//!     .extend([
//!         Extension::new("subject")
//!             .index(100)
//!             .draw(|_, baton| Ok(Outcome::Value(baton.get("subject").cloned().unwrap_or_default()))),
//!         Extension::new("from")
//!             .index(200)
//!             .draw(|_, baton| Ok(Outcome::Value(baton.get("from").cloned().unwrap_or_default()))),
//!     ])
//!     .await?;
//!
//! let mut baton = Baton::new()
//!     .with("subject", json!("Quarterly report"))
//!     .with("from", json!("ada@example.com"));
//!
//! let values = point.invoke(&Capability::Draw, &mut baton).await?.values().await?;
//! assert_eq!(values[0], json!("Quarterly report"));
//! # Ok(())
//! # }
//! ```

mod baton;
mod invocation;
mod point;
mod registry;
mod types;

// Re-export public types
pub use baton::Baton;
pub use invocation::{Invocation, Settled};
pub use point::Point;
pub use registry::ExtensionRegistry;
pub use types::{
    Capability, Entry, Extension, ExtensionError, ExtensionResult, Handler, Outcome,
    DEFAULT_INDEX,
};
