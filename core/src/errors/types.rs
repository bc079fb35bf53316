//! Error and rejection types for token, validation and password policy failures
//!
//! Expected failures (rejected tokens, missing fields, weak passwords) are
//! plain values carried inside an `AuthOutcome`. `TokenError` covers the
//! token machinery itself failing and surfaces as a fault.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a token was not accepted
///
/// Kept for logs only; callers see a single generic message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRejection {
    #[error("token not found")]
    NotFound,

    #[error("token expired")]
    Expired,

    #[error("token already consumed")]
    AlreadyConsumed,

    #[error("token kind mismatch")]
    KindMismatch,
}

/// Token machinery failures
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Access token signing failed")]
    SigningFailed,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Access token expired")]
    AccessTokenExpired,

    #[error("Access token not yet valid")]
    AccessTokenNotYetValid,
}

/// Missing or malformed input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    RequiredField { field: String },

    #[error("{field} is already registered")]
    AlreadyRegistered { field: String },

    #[error("malformed request body")]
    MalformedBody,
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::RequiredField {
            field: field.into(),
        }
    }
}

/// Password strength policy violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },

    #[error("password must be at most {max} bytes")]
    TooLong { max: usize },

    #[error("password must contain an uppercase letter")]
    MissingUppercase,

    #[error("password must contain a lowercase letter")]
    MissingLowercase,

    #[error("password must contain a digit")]
    MissingDigit,

    #[error("password must contain a special character")]
    MissingSpecialChar,
}
