//! MySQL implementation of the AccountRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::MySqlPool;
use uuid::Uuid;

use ca_core::domain::entities::account::Account;
use ca_core::errors::DomainError;
use ca_core::repositories::AccountRepository;

use super::{column, is_unique_violation, parse_uuid};

const SELECT_COLUMNS: &str = "SELECT id, email, password_hash, created_at, updated_at, \
     password_changed_at FROM accounts";

pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &sqlx::mysql::MySqlRow) -> Result<Account, DomainError> {
        let id: String = column(row, "id")?;

        Ok(Account {
            id: parse_uuid(&id, "account")?,
            email: column(row, "email")?,
            password_hash: column(row, "password_hash")?,
            created_at: column::<DateTime<Utc>>(row, "created_at")?,
            updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
            password_changed_at: column::<Option<DateTime<Utc>>>(row, "password_changed_at")?,
        })
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let query = r#"
            INSERT INTO accounts (
                id, email, password_hash, created_at, updated_at, password_changed_at
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(account.id.to_string())
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.created_at)
            .bind(account.updated_at)
            .bind(account.password_changed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Duplicate {
                        resource: "account".to_string(),
                    }
                } else {
                    DomainError::storage(format!("Failed to create account: {}", e))
                }
            })?;

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find account: {}", e)))?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let query = format!("{} WHERE email = ?", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(Account::normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find account: {}", e)))?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let changed_at = changed_at.trunc_subsecs(6);
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = ?, password_changed_at = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(password_hash)
        .bind(changed_at)
        .bind(changed_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update password: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }
}
