//! Domain-level errors.
//!
//! Raised by entity methods that would break a relationship or field rule.
//! Independent of HTTP and storage.

use thiserror::Error;

/// Business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An entity method was called with input that breaks a rule
    #[error("Validation error: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
