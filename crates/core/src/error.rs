//! Domain and storage error model.

use thiserror::Error;

use crate::id::BatchId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic failures only: retrying the same call against the same state
/// yields the same error. Storage concerns live in [`StoreError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The recipe graph reaches `item` again from one of its own descendants.
    #[error("cycle detected at item '{0}'")]
    CycleDetected(String),

    /// No pending build order has this batch id.
    #[error("build order {0} not found")]
    OrderNotFound(BatchId),

    /// A requested or input quantity is non-positive or non-integral.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A value failed validation (e.g. an empty material name).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn cycle(item: impl Into<String>) -> Self {
        Self::CycleDetected(item.into())
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn order_not_found(batch_id: BatchId) -> Self {
        Self::OrderNotFound(batch_id)
    }
}

/// Persistent store failure (ledger or order store).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    #[error("storage error: {0}")]
    Storage(String),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}
