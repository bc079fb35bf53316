//! Token validation without side effects

use std::sync::Arc;

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::entities::token::{TokenKind, TokenVerdict};
use crate::errors::{DomainResult, TokenRejection};
use crate::repositories::TokenRepository;

use super::store::{hash_token_value, TokenStore};

static TOKEN_FORMAT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{43}$").ok());

/// Decides whether a presented token value is usable for a given purpose
///
/// Validation never consumes; the reason for a rejection is returned for
/// logging and must not be shown to callers.
pub struct TokenValidator<R: TokenRepository> {
    store: Arc<TokenStore<R>>,
}

impl<R: TokenRepository> TokenValidator<R> {
    pub fn new(store: Arc<TokenStore<R>>) -> Self {
        Self { store }
    }

    /// Whether `value` has the shape of a value this authority issues
    pub fn is_well_formed(value: &str) -> bool {
        match TOKEN_FORMAT.as_ref() {
            Some(pattern) => pattern.is_match(value),
            None => false,
        }
    }

    /// Validates `value` as a token of kind `expected`
    pub async fn validate(&self, value: &str, expected: TokenKind) -> DomainResult<TokenVerdict> {
        self.validate_at(value, expected, Utc::now()).await
    }

    pub async fn validate_at(
        &self,
        value: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> DomainResult<TokenVerdict> {
        // values we could never have issued skip the store entirely
        if !Self::is_well_formed(value) {
            return Ok(TokenVerdict::Rejected(TokenRejection::NotFound));
        }

        let token_hash = hash_token_value(value);
        let token = match self.store.repository().find_by_hash(&token_hash).await? {
            Some(token)
                if constant_time_eq(token.token_hash.as_bytes(), token_hash.as_bytes()) =>
            {
                token
            }
            _ => return Ok(TokenVerdict::Rejected(TokenRejection::NotFound)),
        };

        Ok(match token.rejection(expected, now) {
            Some(reason) => TokenVerdict::Rejected(reason),
            None => TokenVerdict::Accepted(token),
        })
    }
}
