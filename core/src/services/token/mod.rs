//! Token services
//!
//! - Opaque reset and refresh token issuing and atomic consumption
//! - Side-effect free validation with an internal rejection reason
//! - HS256 access token signing
//! - Background cleanup of spent and expired tokens

mod cleanup;
mod signer;
mod store;
mod validator;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use signer::AccessTokenSigner;
pub use store::{generate_token_value, hash_token_value, TokenStore, TOKEN_VALUE_LENGTH};
pub use validator::TokenValidator;
