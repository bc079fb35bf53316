//! Domain-specific error types and error handling.

mod types;

pub use types::{PasswordPolicyError, TokenError, TokenRejection, ValidationError};

use thiserror::Error;

/// Unexpected faults
///
/// Anything that reaches the boundary as a `DomainError` is answered with a
/// generic 500; expected failures never take this path.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Duplicate record: {resource}")]
    Duplicate { resource: String },

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    pub fn storage(message: impl std::fmt::Display) -> Self {
        DomainError::Storage {
            message: message.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
