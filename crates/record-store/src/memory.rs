use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{Record, RecordId, RecordStore, Result, StoreError, Stored, Version};

/// In-memory record store.
///
/// Records live in a map guarded by an async lock; clones share the same map.
#[derive(Clone)]
pub struct InMemoryRecordStore<R: Record> {
    records: Arc<RwLock<HashMap<RecordId, Stored<R>>>>,
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<R: Record> InMemoryRecordStore<R> {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Removes every record.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    async fn insert(&self, record: R) -> Result<Stored<R>> {
        let id = record.id();
        let mut records = self.records.write().await;

        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists {
                record_type: R::record_type(),
                record_id: id,
            });
        }

        let stored = Stored::first(record);
        records.insert(id, stored.clone());

        metrics::counter!("records_written_total", "record_type" => R::record_type(), "op" => "insert")
            .increment(1);
        tracing::debug!(record_type = R::record_type(), record_id = %id, "record inserted");

        Ok(stored)
    }

    async fn update(&self, record: R, expected: Version) -> Result<Stored<R>> {
        let id = record.id();
        let mut records = self.records.write().await;

        let current = records.get_mut(&id).ok_or(StoreError::NotFound {
            record_type: R::record_type(),
            record_id: id,
        })?;

        if current.version != expected {
            return Err(StoreError::ConcurrencyConflict {
                record_type: R::record_type(),
                record_id: id,
                expected,
                actual: current.version,
            });
        }

        current.record = record;
        current.version = current.version.next();
        current.updated_at = Utc::now();

        metrics::counter!("records_written_total", "record_type" => R::record_type(), "op" => "update")
            .increment(1);
        tracing::debug!(
            record_type = R::record_type(),
            record_id = %id,
            version = %current.version,
            "record updated"
        );

        Ok(current.clone())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Stored<R>>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Stored<R>>> {
        let records = self.records.read().await;
        let mut all: Vec<_> = records.values().cloned().collect();
        all.sort_by_key(|s| s.created_at);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: RecordId,
        text: String,
    }

    impl Record for Note {
        fn record_type() -> &'static str {
            "Note"
        }

        fn id(&self) -> RecordId {
            self.id
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: RecordId::new(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = InMemoryRecordStore::new();
        let n = note("first");

        let stored = store.insert(n.clone()).await.unwrap();
        assert_eq!(stored.version, Version::first());

        let found = store.find_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(found.record, n);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn insert_duplicate_is_rejected() {
        let store = InMemoryRecordStore::new();
        let n = note("dup");

        store.insert(n.clone()).await.unwrap();
        let result = store.insert(n).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let store = InMemoryRecordStore::new();
        let mut n = note("v1");
        store.insert(n.clone()).await.unwrap();

        n.text = "v2".to_string();
        let stored = store.update(n.clone(), Version::first()).await.unwrap();
        assert_eq!(stored.version, Version::new(2));
        assert_eq!(stored.record.text, "v2");
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let store = InMemoryRecordStore::new();
        let n = note("v1");
        store.insert(n.clone()).await.unwrap();
        store.update(n.clone(), Version::first()).await.unwrap();

        let result = store.update(n, Version::first()).await;
        match result {
            Err(StoreError::ConcurrencyConflict {
                expected, actual, ..
            }) => {
                assert_eq!(expected, Version::first());
                assert_eq!(actual, Version::new(2));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_missing_record() {
        let store = InMemoryRecordStore::new();
        let result = store.update(note("ghost"), Version::first()).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let store: InMemoryRecordStore<Note> = InMemoryRecordStore::new();
        assert!(store.find_by_id(RecordId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryRecordStore::new();
        let other = store.clone();
        store.insert(note("shared")).await.unwrap();
        assert_eq!(other.find_all().await.unwrap().len(), 1);

        other.clear().await;
        assert_eq!(store.record_count().await, 0);
    }
}
