//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// data-integrity, conflicts). Storage backends have their own error types and
/// convert into this one at the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or invalid input to an operation (e.g. no product set).
    ///
    /// The message starts with a stable code (`NoProductSet`, `MissingBasePrice`,
    /// `NotEnoughStock`, ...) so callers can match on it.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Programmer or data-integrity error. Fatal to the current operation.
    #[error("logic error: {0}")]
    Logic(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (duplicate key, stale version).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The permission policy refused the operation (e.g. editing a paid invoice).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self::Logic(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// True if this is a validation error carrying the given code.
    pub fn is_validation(&self, code: &str) -> bool {
        matches!(self, Self::Validation(msg) if msg.starts_with(code))
    }

    /// True if this is a logic error carrying the given code.
    pub fn is_logic(&self, code: &str) -> bool {
        matches!(self, Self::Logic(msg) if msg.starts_with(code))
    }
}
