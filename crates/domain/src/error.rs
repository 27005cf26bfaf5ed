//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `#[from]` when crossing a port boundary.

/// Top-level error for everything that crosses a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("service call failed")]
    Service(#[from] ServiceError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// An invariant of a domain value was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid entity id {0:?}, expected `<domain>.<object_id>`")]
    InvalidEntityId(String),

    #[error("unsupported entity domain {0:?}")]
    UnsupportedDomain(String),

    #[error("name must not be empty")]
    EmptyName,
}

/// A lookup by identifier did not match anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A hub service call was rejected or failed while executing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("service {domain}.{service} is not registered")]
    NotRegistered { domain: String, service: String },

    #[error("service {domain}.{service} failed: {reason}")]
    Failed {
        domain: String,
        service: String,
        reason: String,
    },
}
