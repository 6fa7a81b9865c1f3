use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Version number of a stored record, used for optimistic concurrency control.
///
/// A record is stored at version 1 and every accepted update increments it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version of a freshly inserted record.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A record owned by the local service.
pub trait Record: Clone + Send + Sync + 'static {
    /// Returns the record type name, used in errors and logs.
    fn record_type() -> &'static str;

    /// Returns the record's identifier.
    fn id(&self) -> RecordId;
}

/// A record as held by the store, with its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<R> {
    /// The record itself.
    pub record: R,

    /// Current version.
    pub version: Version,

    /// When the record was first stored.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl<R> Stored<R> {
    /// Wraps a record that is being stored for the first time.
    pub fn first(record: R) -> Self {
        let now = Utc::now();
        Self {
            record,
            version: Version::first(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_progression() {
        assert_eq!(Version::default(), Version::new(0));
        assert_eq!(Version::first().next(), Version::new(2));
        assert_eq!(Version::new(7).as_i64(), 7);
    }

    #[test]
    fn stored_first_starts_at_version_one() {
        let stored = Stored::first("payload");
        assert_eq!(stored.version, Version::first());
        assert_eq!(stored.created_at, stored.updated_at);
    }
}
