//! Value objects representing immutable domain concepts.

pub mod outcome;

pub use outcome::{
    AuthFailure, AuthOutcome, FailureKind, Acknowledged, INVALID_CREDENTIALS_MESSAGE,
    INVALID_TOKEN_MESSAGE,
};
