//! Uniform result of the public credential operations.

use serde::ser::{Serialize, Serializer};

use crate::errors::{PasswordPolicyError, TokenRejection, ValidationError};

/// Message returned for every token rejection, whatever the internal reason
pub const INVALID_TOKEN_MESSAGE: &str = "invalid or expired token";

/// Message returned when login credentials do not match
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";

/// Why an operation was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing or malformed input
    Validation(ValidationError),
    /// Bad, expired or consumed token
    Authentication(TokenRejection),
    /// Email/password pair did not match
    InvalidCredentials,
    /// New password is too weak
    Policy(PasswordPolicyError),
}

/// An expected failure: the internal kind plus the caller-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl AuthFailure {
    pub fn validation(error: ValidationError) -> Self {
        Self {
            message: error.to_string(),
            kind: FailureKind::Validation(error),
        }
    }

    /// Token rejection; the message does not reveal `reason`
    pub fn token_rejected(reason: TokenRejection) -> Self {
        Self {
            kind: FailureKind::Authentication(reason),
            message: INVALID_TOKEN_MESSAGE.to_string(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self {
            kind: FailureKind::InvalidCredentials,
            message: INVALID_CREDENTIALS_MESSAGE.to_string(),
        }
    }

    pub fn policy(error: PasswordPolicyError) -> Self {
        Self {
            message: error.to_string(),
            kind: FailureKind::Policy(error),
        }
    }

    /// The internal token rejection reason, if this is a token failure
    pub fn rejection(&self) -> Option<TokenRejection> {
        match self.kind {
            FailureKind::Authentication(reason) => Some(reason),
            _ => None,
        }
    }
}

/// `{success: true, ...data}` or `{success: false, message}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome<T> {
    Success(T),
    Failure(AuthFailure),
}

impl<T> AuthOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            AuthOutcome::Success(_) => None,
            AuthOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            AuthOutcome::Success(data) => Some(data),
            AuthOutcome::Failure(_) => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> AuthOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            AuthOutcome::Success(data) => AuthOutcome::Success(f(data)),
            AuthOutcome::Failure(failure) => AuthOutcome::Failure(failure),
        }
    }
}

impl<T> From<AuthFailure> for AuthOutcome<T> {
    fn from(failure: AuthFailure) -> Self {
        AuthOutcome::Failure(failure)
    }
}

impl<T: Serialize> Serialize for AuthOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Wire<'a, T> {
            success: bool,
            #[serde(flatten)]
            data: Option<&'a T>,
            #[serde(skip_serializing_if = "Option::is_none")]
            message: Option<&'a str>,
        }

        let wire = match self {
            AuthOutcome::Success(data) => Wire {
                success: true,
                data: Some(data),
                message: None,
            },
            AuthOutcome::Failure(failure) => Wire {
                success: false,
                data: None,
                message: Some(failure.message.as_str()),
            },
        };
        wire.serialize(serializer)
    }
}

/// Success payload of operations with nothing to return; adds no fields
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Acknowledged {}
