//! Persistence port for records owned by the local service.
//!
//! Each service keeps its own records; nothing here spans services. The
//! [`RecordStore`] trait is the save/find contract the application layer
//! depends on, and [`InMemoryRecordStore`] is the implementation used by
//! tests and the default service wiring.

pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use common::RecordId;
pub use error::{Result, StoreError};
pub use memory::InMemoryRecordStore;
pub use record::{Record, Stored, Version};
pub use store::RecordStore;
