//! In-memory lookup for tests and local wiring.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::RemoteLookup;
use crate::error::LookupError;

#[derive(Debug)]
struct InMemoryLookupState<E> {
    entities: HashMap<i64, E>,
    failure: Option<LookupError>,
    latency: Duration,
}

impl<E> Default for InMemoryLookupState<E> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            failure: None,
            latency: Duration::ZERO,
        }
    }
}

/// In-memory stand-in for a remote service.
///
/// Counts every call that reaches it, and can be told to fail or to answer
/// slowly. Clones share state.
#[derive(Debug)]
pub struct InMemoryLookup<E> {
    state: Arc<Mutex<InMemoryLookupState<E>>>,
    calls: Arc<AtomicUsize>,
}

impl<E> Clone for InMemoryLookup<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<E> Default for InMemoryLookup<E> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryLookupState::default())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<E: Clone + Send + Sync + 'static> InMemoryLookup<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entity with `id`.
    pub fn insert(&self, id: i64, entity: E) {
        self.state.lock().entities.insert(id, entity);
    }

    /// Removes the entity with `id`.
    pub fn remove(&self, id: i64) -> Option<E> {
        self.state.lock().entities.remove(&id)
    }

    /// Makes every following call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failure =
            failing.then(|| LookupError::Transport("connection refused".to_string()));
    }

    /// Makes every following call fail with `error`.
    pub fn fail_with(&self, error: LookupError) {
        self.state.lock().failure = Some(error);
    }

    /// Delays every following answer by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }

    /// Returns the number of calls that reached this lookup.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> (Duration, Option<LookupError>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        (state.latency, state.failure.clone())
    }

    async fn answer<T>(&self, read: impl FnOnce(&HashMap<i64, E>) -> T) -> Result<T, LookupError> {
        let (latency, failure) = self.begin_call();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(read(&self.state.lock().entities))
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> RemoteLookup for InMemoryLookup<E> {
    type Entity = E;

    async fn exists(&self, id: i64) -> Result<bool, LookupError> {
        self.answer(|entities| entities.contains_key(&id)).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<E>, LookupError> {
        self.answer(|entities| entities.get(&id).cloned()).await
    }
}
