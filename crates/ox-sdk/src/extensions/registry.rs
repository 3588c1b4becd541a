//! Extension Registry
//!
//! Maps point names to points. Points are created on first reference and
//! live as long as the registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::point::Point;
use super::types::Capability;

/// Extension registry
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    points: RwLock<HashMap<String, Arc<Point>>>,
}

impl ExtensionRegistry {
    /// Create a new extension registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the point with the given name, creating it if absent.
    ///
    /// Repeated calls with the same name return the same `Arc`.
    pub async fn point(&self, name: &str) -> Arc<Point> {
        {
            let points = self.points.read().await;
            if let Some(point) = points.get(name) {
                return point.clone();
            }
        }

        let mut points = self.points.write().await;
        points
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating extension point {}", name);
                Arc::new(Point::new(name))
            })
            .clone()
    }

    /// Get or create a point and restrict it to the given capabilities.
    pub async fn declare(
        &self,
        name: &str,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Arc<Point> {
        let point = self.point(name).await;
        point.accept(capabilities).await;
        point
    }

    /// Whether a point with this name has been referenced
    pub async fn contains(&self, name: &str) -> bool {
        self.points.read().await.contains_key(name)
    }

    /// Names of all known points, sorted
    pub async fn points(&self) -> Vec<String> {
        let points = self.points.read().await;
        let mut names: Vec<String> = points.keys().cloned().collect();
        names.sort();
        names
    }
}
