//! MySQL implementation of the TokenRepository trait.
//!
//! Tokens live in the `tokens` table keyed by `token_hash`. Consuming a token
//! locks its row with `SELECT ... FOR UPDATE` inside a transaction, so two
//! handlers racing on the same value are serialized by InnoDB.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::MySqlPool;
use uuid::Uuid;

use ca_core::domain::entities::token::{Token, TokenKind, TokenVerdict};
use ca_core::errors::{DomainError, TokenRejection};
use ca_core::repositories::TokenRepository;

use super::{column, is_unique_violation, parse_uuid};

const SELECT_COLUMNS: &str =
    "SELECT id, kind, subject_id, token_hash, issued_at, expires_at, consumed_at FROM tokens";

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Token entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<Token, DomainError> {
        let id: String = column(row, "id")?;
        let kind: String = column(row, "kind")?;
        let subject_id: String = column(row, "subject_id")?;

        Ok(Token {
            id: parse_uuid(&id, "token")?,
            kind: kind.parse::<TokenKind>().map_err(DomainError::storage)?,
            subject_id: parse_uuid(&subject_id, "subject")?,
            token_hash: column(row, "token_hash")?,
            issued_at: column::<DateTime<Utc>>(row, "issued_at")?,
            expires_at: column::<DateTime<Utc>>(row, "expires_at")?,
            consumed_at: column::<Option<DateTime<Utc>>>(row, "consumed_at")?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_token(&self, token: Token) -> Result<Token, DomainError> {
        let query = r#"
            INSERT INTO tokens (
                id, kind, subject_id, token_hash, issued_at, expires_at, consumed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.kind.as_str())
            .bind(token.subject_id.to_string())
            .bind(&token.token_hash)
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(token.consumed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Duplicate {
                        resource: "token".to_string(),
                    }
                } else {
                    DomainError::storage(format!("Failed to save token: {}", e))
                }
            })?;

        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Token>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find token: {}", e)))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn consume_token(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenVerdict, DomainError> {
        // DATETIME(6) keeps microseconds; match it so release_token can compare
        let now = now.trunc_subsecs(6);
        let query = format!("{} WHERE token_hash = ? FOR UPDATE", SELECT_COLUMNS);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to lock token: {}", e)))?;

        let mut token = match row {
            Some(row) => Self::row_to_token(&row)?,
            None => {
                tx.rollback()
                    .await
                    .map_err(|e| DomainError::storage(format!("Failed to rollback: {}", e)))?;
                return Ok(TokenVerdict::Rejected(TokenRejection::NotFound));
            }
        };

        let verdict = token.try_consume(kind, now);
        if verdict.is_accepted() {
            sqlx::query("UPDATE tokens SET consumed_at = ? WHERE id = ?")
                .bind(now)
                .bind(token.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to consume token: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit consume: {}", e)))?;

        Ok(verdict)
    }

    async fn release_token(
        &self,
        token_hash: &str,
        consumed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE tokens SET consumed_at = NULL WHERE token_hash = ? AND consumed_at = ?",
        )
        .bind(token_hash)
        .bind(consumed_at.trunc_subsecs(6))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to release token: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_active_by_subject(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
    ) -> Result<Vec<Token>, DomainError> {
        let query = format!(
            "{} WHERE subject_id = ? AND kind = ? AND consumed_at IS NULL AND expires_at > ? \
             ORDER BY issued_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(subject_id.to_string())
            .bind(kind.as_str())
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find subject tokens: {}", e)))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn revoke_subject_tokens(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE tokens SET consumed_at = ? \
             WHERE subject_id = ? AND kind = ? AND consumed_at IS NULL",
        )
        .bind(now.trunc_subsecs(6))
        .bind(subject_id.to_string())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to revoke tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_stale_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at < ? OR consumed_at < ?")
            .bind(cutoff)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete stale tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}
