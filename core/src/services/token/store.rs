//! Token store: issues opaque single-use tokens and consumes them atomically

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::entities::token::{IssuedToken, Token, TokenKind, TokenVerdict};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;

/// Number of random bytes behind every token value
pub const TOKEN_ENTROPY_BYTES: usize = 32;

/// Length of an encoded token value (32 bytes, unpadded URL-safe base64)
pub const TOKEN_VALUE_LENGTH: usize = 43;

/// Generates a fresh, unpredictable token value
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 digest of a token value, the form tokens are stored under
pub fn hash_token_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Issues, looks up and consumes reset and refresh tokens
///
/// Only hashes are handed to the repository. The raw value leaves the store
/// exactly once, inside the `IssuedToken` returned by [`TokenStore::issue`].
pub struct TokenStore<R: TokenRepository> {
    repository: Arc<R>,
}

impl<R: TokenRepository> TokenStore<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Issues a new token of `kind` for `subject_id`, valid for `ttl`
    pub async fn issue(
        &self,
        kind: TokenKind,
        subject_id: Uuid,
        ttl: Duration,
    ) -> DomainResult<IssuedToken> {
        let value = generate_token_value();
        let token = Token::new(kind, subject_id, hash_token_value(&value), ttl);

        let token = match self.repository.save_token(token).await {
            Ok(token) => token,
            // 256 bits of entropy; a collision means the generator is broken
            Err(DomainError::Duplicate { .. }) => {
                warn!(kind = %kind, "Generated token value collided with a stored one");
                return Err(TokenError::TokenGenerationFailed.into());
            }
            Err(e) => return Err(e),
        };

        debug!(
            kind = %kind,
            subject_id = %subject_id,
            token_id = %token.id,
            expires_at = %token.expires_at,
            "Issued token"
        );

        Ok(IssuedToken { value, token })
    }

    /// Looks up the record behind a raw token value without changing it
    pub async fn lookup(&self, value: &str) -> DomainResult<Option<Token>> {
        self.repository.find_by_hash(&hash_token_value(value)).await
    }

    /// Atomically consumes a raw token value as `kind`
    ///
    /// Of any number of concurrent calls for the same value, at most one
    /// returns `Accepted`.
    pub async fn consume(&self, value: &str, kind: TokenKind) -> DomainResult<TokenVerdict> {
        self.consume_at(value, kind, Utc::now()).await
    }

    pub async fn consume_at(
        &self,
        value: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> DomainResult<TokenVerdict> {
        let verdict = self
            .repository
            .consume_token(&hash_token_value(value), kind, now)
            .await?;

        match &verdict {
            TokenVerdict::Accepted(token) => {
                debug!(kind = %kind, token_id = %token.id, "Consumed token")
            }
            TokenVerdict::Rejected(reason) => {
                debug!(kind = %kind, reason = %reason, "Token consume rejected")
            }
        }

        Ok(verdict)
    }

    /// Revokes every unconsumed token of `kind` belonging to `subject_id`
    pub async fn revoke_subject_tokens(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
    ) -> DomainResult<usize> {
        let revoked = self
            .repository
            .revoke_subject_tokens(subject_id, kind, Utc::now())
            .await?;

        if revoked > 0 {
            debug!(kind = %kind, subject_id = %subject_id, revoked, "Revoked subject tokens");
        }

        Ok(revoked)
    }

    /// Unconsumed, unexpired tokens of `kind` for `subject_id`
    pub async fn active_tokens(&self, subject_id: Uuid, kind: TokenKind) -> DomainResult<Vec<Token>> {
        self.repository.find_active_by_subject(subject_id, kind).await
    }

    /// Deletes records that expired or were consumed before `cutoff`
    pub async fn purge_stale(&self, cutoff: DateTime<Utc>) -> DomainResult<usize> {
        self.repository.delete_stale_tokens(cutoff).await
    }
}
