//! Account repository trait defining the interface for credential state persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::account::Account;
use crate::errors::DomainError;

/// Repository trait for `Account` persistence operations
///
/// `update_password_hash` is the only way the stored hash changes and must be
/// a single atomic write.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account
    ///
    /// # Returns
    /// * `Err(DomainError::Duplicate)` - The email is already registered
    async fn create(&self, account: Account) -> Result<Account, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError>;

    /// Find an account by its normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Replace the password hash of an account
    ///
    /// # Returns
    /// * `Ok(true)` - Hash replaced
    /// * `Ok(false)` - No such account
    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}
