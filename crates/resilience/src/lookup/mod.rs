//! Ports for asking another service about the entities it owns.

mod http;
mod memory;
mod unconfigured;

pub use http::HttpLookup;
pub use memory::InMemoryLookup;
pub use unconfigured::UnconfiguredLookup;

use async_trait::async_trait;

use crate::error::LookupError;

/// Raw, unprotected access to one remote service's entities.
///
/// Implementations report absence as `Ok(false)` / `Ok(None)` and reserve
/// `Err` for calls that produced no trustworthy answer. They do not retry
/// and do not apply a timeout of their own beyond what the transport needs;
/// the resilient client bounds every call.
#[async_trait]
pub trait RemoteLookup: Send + Sync + 'static {
    /// The entity type returned by [`get_by_id`](Self::get_by_id).
    type Entity: Clone + Send + Sync + 'static;

    /// Asks whether the entity with `id` exists.
    async fn exists(&self, id: i64) -> Result<bool, LookupError>;

    /// Fetches the entity with `id`, or None if the remote has no such entity.
    async fn get_by_id(&self, id: i64) -> Result<Option<Self::Entity>, LookupError>;
}
