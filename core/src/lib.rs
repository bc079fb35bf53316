//! # Credential Authority Core
//!
//! Domain layer for password resets and refresh token exchange.
//! This crate contains the token and account entities, the token store and
//! validator, the credential authority and its facade, repository interfaces,
//! error types and a framework-independent request boundary.

pub mod boundary;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
