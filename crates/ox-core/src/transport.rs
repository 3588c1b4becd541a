//! Transport boundary used by list loaders.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{QueryParams, Record};

/// Fetches one page of flat records from a backend module.
///
/// `params` already contains the paging range (`limit=start,end`) and the
/// column projection. Implementations must not add an `index` field.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, module: &str, params: &QueryParams) -> Result<Vec<Record>>;
}
