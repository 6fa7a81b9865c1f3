//! Manifest status and priority.

use serde::{Deserialize, Serialize};

/// Where a manifested cargo load is in its journey.
///
/// Statuses are not ordered by a transition table: any status may be
/// proposed on update as long as the resulting record is consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManifestStatus {
    /// Declared but not yet aboard.
    #[default]
    Pending,

    /// Aboard the spacecraft.
    Loaded,

    /// Aboard and travelling.
    InTransit,

    /// Removed from the spacecraft.
    Unloaded,
}

impl ManifestStatus {
    /// Returns true if the cargo is aboard in this status.
    pub fn is_aboard(&self) -> bool {
        matches!(self, ManifestStatus::Loaded | ManifestStatus::InTransit)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestStatus::Pending => "PENDING",
            ManifestStatus::Loaded => "LOADED",
            ManifestStatus::InTransit => "IN_TRANSIT",
            ManifestStatus::Unloaded => "UNLOADED",
        }
    }
}

impl std::fmt::Display for ManifestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handling priority of a manifested load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManifestPriority {
    #[default]
    Normal,
    High,
    Critical,
}

impl ManifestPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestPriority::Normal => "NORMAL",
            ManifestPriority::High => "HIGH",
            ManifestPriority::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for ManifestPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
