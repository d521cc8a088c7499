//! In-memory index contract.
//!
//! Collections keep an index of this shape synchronized with their record
//! files. The index owns lookup, filtering and scoring; collections never
//! reimplement them.

use crate::error::StoreError;
use crate::schema::RecordSchema;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;

/// Predicate over records, used by scans and search filters.
pub type RecordPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Options for predicate scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Matching records to skip before collecting results.
    pub skip: usize,
    pub include_vectors: bool,
}

/// Options for similarity search.
pub struct SearchOptions<R> {
    pub skip: usize,
    pub include_vectors: bool,
    /// Vector property to search; `None` uses the record's default vector.
    pub vector_property: Option<String>,
    /// Only records matching the filter are scored.
    pub filter: Option<RecordPredicate<R>>,
}

impl<R> SearchOptions<R> {
    pub fn with_filter(mut self, filter: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_vector_property(mut self, property: impl Into<String>) -> Self {
        self.vector_property = Some(property.into());
        self
    }
}

impl<R> Default for SearchOptions<R> {
    fn default() -> Self {
        Self {
            skip: 0,
            include_vectors: false,
            vector_property: None,
            filter: None,
        }
    }
}

impl<R> Clone for SearchOptions<R> {
    fn clone(&self) -> Self {
        Self {
            skip: self.skip,
            include_vectors: self.include_vectors,
            vector_property: self.vector_property.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<R> fmt::Debug for SearchOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("skip", &self.skip)
            .field("include_vectors", &self.include_vectors)
            .field("vector_property", &self.vector_property)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord<R> {
    pub record: R,
    /// Similarity, higher is closer.
    pub score: f32,
}

/// Capability the collection façade keeps in sync with disk.
#[async_trait]
pub trait RecordIndex<S: RecordSchema>: Send + Sync {
    async fn ensure_exists(&self) -> Result<(), StoreError>;

    /// Drop every record and the collection itself.
    async fn destroy(&self) -> Result<(), StoreError>;

    async fn exists(&self) -> Result<bool, StoreError>;

    async fn upsert(&self, record: S::Record) -> Result<S::Key, StoreError>;

    async fn upsert_batch(&self, records: Vec<S::Record>) -> Result<Vec<S::Key>, StoreError>;

    async fn get(
        &self,
        key: &S::Key,
        include_vectors: bool,
    ) -> Result<Option<S::Record>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, key: &S::Key) -> Result<bool, StoreError>;

    async fn scan(
        &self,
        predicate: RecordPredicate<S::Record>,
        max_results: usize,
        options: ScanOptions,
    ) -> Result<BoxStream<'static, S::Record>, StoreError>;

    async fn search(
        &self,
        query: &[f32],
        max_results: usize,
        options: SearchOptions<S::Record>,
    ) -> Result<BoxStream<'static, ScoredRecord<S::Record>>, StoreError>;

    async fn len(&self) -> Result<usize, StoreError>;
}
