//! Foreign references carried by commands.

use common::{CargoId, EntityKind, SpacecraftId, StorageUnitId, UserId};
use serde::Serialize;

/// A typed pointer at an entity owned by another service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Cargo(CargoId),
    StorageUnit(StorageUnitId),
    Spacecraft(SpacecraftId),
    User(UserId),
}

impl EntityRef {
    /// Returns the kind of entity referenced.
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Cargo(_) => CargoId::KIND,
            EntityRef::StorageUnit(_) => StorageUnitId::KIND,
            EntityRef::Spacecraft(_) => SpacecraftId::KIND,
            EntityRef::User(_) => UserId::KIND,
        }
    }

    /// Returns the raw key of the referenced entity.
    pub fn raw_id(&self) -> i64 {
        match self {
            EntityRef::Cargo(id) => id.value(),
            EntityRef::StorageUnit(id) => id.value(),
            EntityRef::Spacecraft(id) => id.value(),
            EntityRef::User(id) => id.value(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

impl From<CargoId> for EntityRef {
    fn from(id: CargoId) -> Self {
        EntityRef::Cargo(id)
    }
}

impl From<StorageUnitId> for EntityRef {
    fn from(id: StorageUnitId) -> Self {
        EntityRef::StorageUnit(id)
    }
}

impl From<SpacecraftId> for EntityRef {
    fn from(id: SpacecraftId) -> Self {
        EntityRef::Spacecraft(id)
    }
}

impl From<UserId> for EntityRef {
    fn from(id: UserId) -> Self {
        EntityRef::User(id)
    }
}

/// A foreign reference together with the command field that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    /// Field name as it appears on the wire.
    pub field: &'static str,

    /// The referenced entity.
    pub target: EntityRef,
}

impl Reference {
    pub fn new(field: &'static str, target: impl Into<EntityRef>) -> Self {
        Self {
            field,
            target: target.into(),
        }
    }
}

/// Commands that point at entities owned by other services.
pub trait HasReferences {
    /// Returns every present reference in field declaration order.
    ///
    /// Absent optional references are skipped. The order is the order in
    /// which problems are reported.
    fn references(&self) -> Vec<Reference>;
}

/// Collects present references, preserving the order they are pushed in.
#[derive(Debug, Default)]
pub(crate) struct ReferenceList(Vec<Reference>);

impl ReferenceList {
    pub(crate) fn push<T: Into<EntityRef>>(mut self, field: &'static str, id: Option<T>) -> Self {
        if let Some(id) = id {
            self.0.push(Reference::new(field, id));
        }
        self
    }

    pub(crate) fn into_vec(self) -> Vec<Reference> {
        self.0
    }
}
