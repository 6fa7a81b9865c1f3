use std::marker::PhantomData;

use async_trait::async_trait;

use super::RemoteLookup;
use crate::error::LookupError;

/// Lookup for a dependency that has no endpoint.
///
/// Every call fails with [`LookupError::Unconfigured`], so references to the
/// dependency are reported as unavailable and never as missing.
#[derive(Debug)]
pub struct UnconfiguredLookup<E> {
    dependency: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> UnconfiguredLookup<E> {
    pub fn new(dependency: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            _entity: PhantomData,
        }
    }

    fn error(&self) -> LookupError {
        LookupError::Unconfigured(self.dependency.clone())
    }
}

#[async_trait]
impl<E> RemoteLookup for UnconfiguredLookup<E>
where
    E: Clone + Send + Sync + 'static,
{
    type Entity = E;

    async fn exists(&self, _id: i64) -> Result<bool, LookupError> {
        Err(self.error())
    }

    async fn get_by_id(&self, _id: i64) -> Result<Option<E>, LookupError> {
        Err(self.error())
    }
}
