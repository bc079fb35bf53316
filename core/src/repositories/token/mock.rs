//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{Token, TokenKind, TokenVerdict};
use crate::errors::{DomainError, TokenRejection};

use super::r#trait::TokenRepository;

/// Mock token repository for testing
///
/// A single write lock makes `consume_token` atomic. `fail_writes` turns
/// every mutating call into a storage error.
#[derive(Default)]
pub struct MockTokenRepository {
    tokens: RwLock<HashMap<String, Token>>,
    fail_writes: AtomicBool,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Overwrite a stored record (e.g. to backdate its expiry)
    pub async fn put(&self, token: Token) {
        self.tokens.write().await.insert(token.token_hash.clone(), token);
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::storage("mock store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save_token(&self, token: Token) -> Result<Token, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Duplicate {
                resource: "token".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Token>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn consume_token(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenVerdict, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token_hash) {
            Some(token) => Ok(token.try_consume(kind, now)),
            None => Ok(TokenVerdict::Rejected(TokenRejection::NotFound)),
        }
    }

    async fn release_token(
        &self,
        token_hash: &str,
        consumed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token_hash) {
            Some(token) if token.consumed_at == Some(consumed_at) => {
                token.consumed_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_active_by_subject(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
    ) -> Result<Vec<Token>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.subject_id == subject_id && t.kind == kind && t.is_valid())
            .cloned()
            .collect())
    }

    async fn revoke_subject_tokens(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.subject_id == subject_id && token.kind == kind && !token.is_consumed() {
                token.consumed_at = Some(now);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_stale_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| !token.is_stale(cutoff));

        Ok(initial_count - tokens.len())
    }
}
