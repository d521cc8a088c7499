//! Embedding generation for value searches.

use crate::error::StoreError;
use async_trait::async_trait;

/// Turns a search value into a query vector.
///
/// Stores hand their generator to every collection they open; collections
/// use it for [`search_value`](crate::Collection::search_value).
#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    async fn embed(&self, value: &str) -> Result<Vec<f32>, StoreError>;
}
