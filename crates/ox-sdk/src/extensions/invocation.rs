//! Aggregate result of invoking a point.

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;

use super::types::{Capability, ExtensionResult, Outcome};

/// Outcomes collected by one `Point::invoke` call, in invocation order.
#[derive(Debug)]
pub struct Invocation {
    point: String,
    capability: Capability,
    outcomes: Vec<(String, Outcome)>,
}

/// Final result of one extension after settling.
#[derive(Debug)]
pub struct Settled {
    pub id: String,
    pub result: ExtensionResult<Value>,
}

impl Invocation {
    pub(crate) fn new(point: impl Into<String>, capability: Capability) -> Self {
        Self {
            point: point.into(),
            capability,
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, id: impl Into<String>, outcome: Outcome) {
        self.outcomes.push((id.into(), outcome));
    }

    pub fn point(&self) -> &str {
        &self.point
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Number of extensions that were called.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Ids of the called extensions, in call order.
    pub fn ids(&self) -> Vec<&str> {
        self.outcomes.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Whether any extension returned work that has not settled yet.
    pub fn has_pending(&self) -> bool {
        self.outcomes.iter().any(|(_, o)| o.is_pending())
    }

    /// Await every outcome concurrently. Results keep call order;
    /// `Outcome::Done` settles to `Value::Null`.
    pub async fn settle(self) -> Vec<Settled> {
        let (ids, futures): (Vec<String>, Vec<BoxFuture<'static, ExtensionResult<Value>>>) = self
            .outcomes
            .into_iter()
            .map(|(id, outcome)| {
                let fut = match outcome {
                    Outcome::Done => future::ready(Ok(Value::Null)).boxed(),
                    Outcome::Value(value) => future::ready(Ok(value)).boxed(),
                    Outcome::Pending(fut) => fut,
                };
                (id, fut)
            })
            .unzip();

        let results = future::join_all(futures).await;
        ids.into_iter()
            .zip(results)
            .map(|(id, result)| Settled { id, result })
            .collect()
    }

    /// Settle and return all values, failing on the first error in call order.
    pub async fn values(self) -> ExtensionResult<Vec<Value>> {
        self.settle().await.into_iter().map(|s| s.result).collect()
    }
}
