//! Optimistic concurrency behavior of the in-memory store under parallel writers.

use record_store::{InMemoryRecordStore, Record, RecordId, RecordStore, StoreError, Version};

#[derive(Debug, Clone, PartialEq)]
struct Counter {
    id: RecordId,
    value: i64,
}

impl Record for Counter {
    fn record_type() -> &'static str {
        "Counter"
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_writer_wins_per_version() {
    let store = InMemoryRecordStore::new();
    let counter = Counter {
        id: RecordId::new(),
        value: 0,
    };
    store.insert(counter.clone()).await.unwrap();

    let handles: Vec<_> = (1..=8)
        .map(|value| {
            let store = store.clone();
            let counter = Counter { value, ..counter.clone() };
            tokio::spawn(async move { store.update(counter, Version::first()).await })
        })
        .collect();

    let mut won = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(stored) => {
                assert_eq!(stored.version, Version::new(2));
                won += 1;
            }
            Err(StoreError::ConcurrencyConflict {
                expected, actual, ..
            }) => {
                assert_eq!(expected, Version::first());
                assert_eq!(actual, Version::new(2));
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(won, 1);
    assert_eq!(conflicts, 7);
    let stored = store.find_by_id(counter.id).await.unwrap().unwrap();
    assert_eq!(stored.version, Version::new(2));
}

#[tokio::test]
async fn sequential_writers_that_reread_all_succeed() {
    let store = InMemoryRecordStore::new();
    let id = RecordId::new();
    store.insert(Counter { id, value: 0 }).await.unwrap();

    for value in 1..=5 {
        let current = store.find_by_id(id).await.unwrap().unwrap();
        store
            .update(Counter { id, value }, current.version)
            .await
            .unwrap();
    }

    let stored = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.record.value, 5);
    assert_eq!(stored.version, Version::new(6));
    assert!(stored.updated_at >= stored.created_at);
}
