//! In-memory implementation of the TokenRepository trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use ca_core::domain::entities::token::{Token, TokenKind, TokenVerdict};
use ca_core::errors::{DomainError, TokenRejection};
use ca_core::repositories::TokenRepository;

type Entry = Arc<Mutex<Token>>;

/// Token map guarded by per-record locks
///
/// The outer lock only protects the shape of the map (insert and delete).
/// Reading or changing a record takes that record's own mutex, which is
/// what makes `consume_token` a check-and-set.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: RwLock<HashMap<String, Entry>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, spent ones included
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    async fn entry(&self, token_hash: &str) -> Option<Entry> {
        self.tokens.read().await.get(token_hash).cloned()
    }

    /// Every record, each behind its own lock
    async fn entries(&self) -> Vec<Entry> {
        self.tokens.read().await.values().cloned().collect()
    }
}

fn lock(entry: &Entry) -> Result<MutexGuard<'_, Token>, DomainError> {
    entry
        .lock()
        .map_err(|_| DomainError::storage("token record lock poisoned"))
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_token(&self, token: Token) -> Result<Token, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Duplicate {
                resource: "token".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), Arc::new(Mutex::new(token.clone())));
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Token>, DomainError> {
        let Some(entry) = self.entry(token_hash).await else {
            return Ok(None);
        };

        let token = lock(&entry)?.clone();
        Ok(Some(token))
    }

    async fn consume_token(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenVerdict, DomainError> {
        let Some(entry) = self.entry(token_hash).await else {
            return Ok(TokenVerdict::Rejected(TokenRejection::NotFound));
        };

        let mut token = lock(&entry)?;
        Ok(token.try_consume(kind, now))
    }

    async fn release_token(
        &self,
        token_hash: &str,
        consumed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let Some(entry) = self.entry(token_hash).await else {
            return Ok(false);
        };

        let mut token = lock(&entry)?;
        if token.consumed_at == Some(consumed_at) {
            token.consumed_at = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_active_by_subject(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
    ) -> Result<Vec<Token>, DomainError> {
        let mut active = Vec::new();
        for entry in self.entries().await {
            let token = lock(&entry)?;
            if token.subject_id == subject_id && token.kind == kind && token.is_valid() {
                active.push(token.clone());
            }
        }
        Ok(active)
    }

    async fn revoke_subject_tokens(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut count = 0;
        for entry in self.entries().await {
            let mut token = lock(&entry)?;
            if token.subject_id == subject_id && token.kind == kind && !token.is_consumed() {
                token.consumed_at = Some(now);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete_stale_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut stale = Vec::new();

        for (hash, entry) in tokens.iter() {
            if lock(entry)?.is_stale(cutoff) {
                stale.push(hash.clone());
            }
        }
        for hash in &stale {
            tokens.remove(hash);
        }

        Ok(stale.len())
    }
}
