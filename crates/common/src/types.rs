use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a record owned by the local service.
///
/// Wraps a UUID so locally owned records can never be confused with the
/// numeric keys of entities owned by other services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a record ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RecordId> for Uuid {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// The kinds of entity owned by other services that local records point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Cargo,
    StorageUnit,
    Spacecraft,
    User,
}

impl EntityKind {
    /// Returns the human-readable entity name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Cargo => "Cargo",
            EntityKind::StorageUnit => "StorageUnit",
            EntityKind::Spacecraft => "Spacecraft",
            EntityKind::User => "User",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates the identifier from the owning service's key.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw key.
            pub fn value(&self) -> i64 {
                self.0
            }

            /// The kind of entity this identifier refers to.
            pub const KIND: EntityKind = $kind;
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

remote_id!(
    /// Key of a cargo item owned by the cargo service.
    CargoId => EntityKind::Cargo
);
remote_id!(
    /// Key of a storage unit owned by the inventory service.
    StorageUnitId => EntityKind::StorageUnit
);
remote_id!(
    /// Key of a spacecraft owned by the spacecraft service.
    SpacecraftId => EntityKind::Spacecraft
);
remote_id!(
    /// Key of a user owned by the user service.
    UserId => EntityKind::User
);
