//! Brute-force in-memory index.
//!
//! Records live in an ordered map, so scans and score ties come out in key
//! order. Search scores every candidate; fine for the collection sizes a
//! one-file-per-record layout is meant for.

use super::contract::{RecordIndex, RecordPredicate, ScanOptions, ScoredRecord, SearchOptions};
use super::distance::DistanceMetric;
use crate::error::StoreError;
use crate::schema::RecordSchema;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// In-memory index for one collection.
///
/// `None` means the collection does not exist (never ensured, or destroyed).
pub struct InMemoryIndex<S: RecordSchema> {
    name: String,
    schema: S,
    metric: DistanceMetric,
    records: RwLock<Option<BTreeMap<S::Key, S::Record>>>,
}

impl<S: RecordSchema> InMemoryIndex<S> {
    pub fn new(name: impl Into<String>, schema: S, metric: DistanceMetric) -> Self {
        Self {
            name: name.into(),
            schema,
            metric,
            records: RwLock::new(None),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn missing(&self) -> StoreError {
        StoreError::CollectionMissing {
            collection: self.name.clone(),
        }
    }

    fn present(&self, mut record: S::Record, include_vectors: bool) -> S::Record {
        if !include_vectors {
            self.schema.strip_vectors(&mut record);
        }
        record
    }
}

#[async_trait]
impl<S: RecordSchema> RecordIndex<S> for InMemoryIndex<S> {
    async fn ensure_exists(&self) -> Result<(), StoreError> {
        self.records.write().get_or_insert_with(BTreeMap::new);
        Ok(())
    }

    async fn destroy(&self) -> Result<(), StoreError> {
        *self.records.write() = None;
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.records.read().is_some())
    }

    async fn upsert(&self, record: S::Record) -> Result<S::Key, StoreError> {
        let key = self.schema.key_of(&record)?;
        let mut guard = self.records.write();
        let records = guard.as_mut().ok_or_else(|| self.missing())?;
        records.insert(key.clone(), record);
        Ok(key)
    }

    async fn upsert_batch(&self, records: Vec<S::Record>) -> Result<Vec<S::Key>, StoreError> {
        // Extract every key first so a bad record leaves the index untouched.
        let keyed = records
            .into_iter()
            .map(|record| Ok((self.schema.key_of(&record)?, record)))
            .collect::<Result<Vec<_>, StoreError>>()?;

        let mut guard = self.records.write();
        let map = guard.as_mut().ok_or_else(|| self.missing())?;
        let mut keys = Vec::with_capacity(keyed.len());
        for (key, record) in keyed {
            keys.push(key.clone());
            map.insert(key, record);
        }
        Ok(keys)
    }

    async fn get(
        &self,
        key: &S::Key,
        include_vectors: bool,
    ) -> Result<Option<S::Record>, StoreError> {
        let record = self
            .records
            .read()
            .as_ref()
            .and_then(|records| records.get(key).cloned());
        Ok(record.map(|r| self.present(r, include_vectors)))
    }

    async fn delete(&self, key: &S::Key) -> Result<bool, StoreError> {
        Ok(self
            .records
            .write()
            .as_mut()
            .map(|records| records.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn scan(
        &self,
        predicate: RecordPredicate<S::Record>,
        max_results: usize,
        options: ScanOptions,
    ) -> Result<BoxStream<'static, S::Record>, StoreError> {
        let matches: Vec<S::Record> = match self.records.read().as_ref() {
            Some(records) => records
                .values()
                .filter(|record| predicate(*record))
                .skip(options.skip)
                .take(max_results)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        let matches: Vec<S::Record> = matches
            .into_iter()
            .map(|r| self.present(r, options.include_vectors))
            .collect();
        Ok(stream::iter(matches).boxed())
    }

    async fn search(
        &self,
        query: &[f32],
        max_results: usize,
        options: SearchOptions<S::Record>,
    ) -> Result<BoxStream<'static, ScoredRecord<S::Record>>, StoreError> {
        if query.is_empty() {
            return Err(StoreError::InvalidQuery(
                "query vector cannot be empty".to_string(),
            ));
        }

        let mut scored: Vec<(S::Key, f32)> = match self.records.read().as_ref() {
            Some(records) => records
                .iter()
                .filter(|(_, record)| options.filter.as_ref().map_or(true, |f| f(*record)))
                .filter_map(|(key, record)| {
                    let vector = self
                        .schema
                        .vector_of(record, options.vector_property.as_deref())?;
                    // Wrong-dimension vectors are not comparable; leave them out.
                    if vector.len() != query.len() {
                        return None;
                    }
                    Some((key.clone(), self.metric.similarity(query, &vector)))
                })
                .collect(),
            None => Vec::new(),
        };

        scored.sort_by(|(key_a, score_a), (key_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| key_a.cmp(key_b))
        });

        let hits: Vec<ScoredRecord<S::Record>> = {
            let guard = self.records.read();
            let Some(records) = guard.as_ref() else {
                return Ok(stream::empty().boxed());
            };
            scored
                .into_iter()
                .skip(options.skip)
                .take(max_results)
                .filter_map(|(key, score)| {
                    records.get(&key).cloned().map(|record| ScoredRecord {
                        record: self.present(record, options.include_vectors),
                        score,
                    })
                })
                .collect()
        };
        Ok(stream::iter(hits).boxed())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().as_ref().map_or(0, BTreeMap::len))
    }
}
