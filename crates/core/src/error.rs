//! Domain error model.

use thiserror::Error;

use crate::store::StoreError;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every store component returns this type. Business rejections
/// (validation, state machine, stock) are deterministic and never retried;
/// `Persistence` carries collaborator failures unchanged and `PartialFailure`
/// reports a multi-step write that could not be fully undone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The delivery state machine does not allow this transition.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// The operation is not allowed in the entity's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A location was missing or out of range.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// Not enough stock to satisfy a decrement.
    #[error("insufficient stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// A concurrent writer changed the record first, or the record already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The persistence collaborator failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A multi-step write failed and some of its effects are still applied.
    #[error("partial failure: {cause} (left applied: {})", .applied.join(", "))]
    PartialFailure { cause: String, applied: Vec<String> },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_location(msg: impl Into<String>) -> Self {
        Self::InvalidLocation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Stable machine-readable code, used as a tracing field.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::NotFound { .. } => "not_found",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::InvalidState(_) => "invalid_state",
            DomainError::InvalidLocation(_) => "invalid_location",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::Conflict(_) => "conflict",
            DomainError::Persistence(_) => "persistence_error",
            DomainError::PartialFailure { .. } => "partial_failure",
        }
    }

    /// True for failures caused by the persistence collaborator rather than the caller.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            DomainError::Persistence(_) | DomainError::PartialFailure { .. }
        )
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::Duplicate { entity, id } => {
                DomainError::Conflict(format!("{entity} {id} already exists"))
            }
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Insufficient {
                id,
                requested,
                available,
            } => DomainError::InsufficientStock {
                product: id,
                requested,
                available,
            },
            StoreError::Backend(msg) => DomainError::Persistence(msg),
        }
    }
}
