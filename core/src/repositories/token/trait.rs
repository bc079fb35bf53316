//! Token repository trait defining the interface for reset and refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{Token, TokenKind, TokenVerdict};
use crate::errors::DomainError;

/// Repository trait for `Token` persistence operations
///
/// Records are keyed by `token_hash`; raw token values never reach the
/// repository.
///
/// # Atomicity
/// `consume_token` must check and set the consumed state in one indivisible
/// step: of any number of concurrent calls for the same hash, at most one
/// returns `Accepted`.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a newly issued token
    ///
    /// # Returns
    /// * `Ok(Token)` - The saved token
    /// * `Err(DomainError::Duplicate)` - A token with the same hash exists
    /// * `Err(DomainError)` - Storage failure
    async fn save_token(&self, token: Token) -> Result<Token, DomainError>;

    /// Find a token by its hashed value, without changing its state
    ///
    /// # Example
    /// ```no_run
    /// # use ca_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// match repo.find_by_hash("sha256_hash_of_token").await? {
    ///     Some(token) if token.is_valid() => println!("valid for {}", token.subject_id),
    ///     Some(_) => println!("used or expired"),
    ///     None => println!("unknown token"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Token>, DomainError>;

    /// Atomically consume a token if it is usable as `kind` at `now`
    ///
    /// # Returns
    /// * `Ok(TokenVerdict::Accepted(token))` - This call consumed the token
    /// * `Ok(TokenVerdict::Rejected(reason))` - Not found, expired, already
    ///   consumed or of another kind; nothing was changed
    /// * `Err(DomainError)` - Storage failure
    async fn consume_token(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenVerdict, DomainError>;

    /// Undo a consume whose follow-up write failed
    ///
    /// Clears `consumed_at` only if it still equals `consumed_at`, so a token
    /// revoked or consumed again in the meantime is left alone.
    ///
    /// # Returns
    /// * `Ok(true)` - The token is usable again
    async fn release_token(
        &self,
        token_hash: &str,
        consumed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Find all unconsumed, unexpired tokens of `kind` for a subject
    async fn find_active_by_subject(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
    ) -> Result<Vec<Token>, DomainError>;

    /// Mark every unconsumed token of `kind` for a subject as consumed
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens revoked
    async fn revoke_subject_tokens(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Delete tokens that expired or were consumed before `cutoff`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens deleted
    async fn delete_stale_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Count active tokens of `kind` for a subject
    async fn count_active_tokens(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
    ) -> Result<usize, DomainError> {
        let tokens = self.find_active_by_subject(subject_id, kind).await?;
        Ok(tokens.len())
    }
}
