//! Core aggregate trait.

use record_store::Record;

/// Trait for aggregates whose consistency can be checked from their own fields.
///
/// Validation is a pure function of the aggregate value:
/// - It never performs I/O or consults previously stored state
/// - Given the same value, it always produces the same result
/// - The first violated rule is reported
pub trait Aggregate: Record {
    /// The type of errors validation can produce.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Checks the aggregate's internal invariants.
    fn validate(&self) -> Result<(), Self::Error>;
}
