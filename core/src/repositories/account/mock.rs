//! Mock implementation of AccountRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::account::Account;
use crate::errors::DomainError;

use super::r#trait::AccountRepository;

#[derive(Default)]
pub struct MockAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
    fail_updates: AtomicBool,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent password update fail with a storage error
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    /// Delete an account behind the authority's back
    pub async fn remove(&self, id: Uuid) -> Option<Account> {
        self.accounts.write().await.remove(&id)
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(DomainError::Duplicate {
                resource: "account".to_string(),
            });
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let email = Account::normalize_email(email);
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DomainError::storage("mock account store unavailable"));
        }
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&id) {
            Some(account) => {
                account.replace_password_hash(password_hash.to_string(), changed_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
