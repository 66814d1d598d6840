//! Record store error model.

use thiserror::Error;

/// Result type used by the record store and record validation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
///
/// The aggregation engine never produces these; it degrades to empty
/// results instead. Everything here is raised at the store boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// A record failed validation (bad size, negative amount, unknown enum...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The record is already present (same id or same import hash).
    #[error("duplicate: {0}")]
    Duplicate(String),
}

impl StoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
