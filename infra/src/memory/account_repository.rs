//! In-memory implementation of the AccountRepository trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use ca_core::domain::entities::account::Account;
use ca_core::errors::DomainError;
use ca_core::repositories::AccountRepository;

#[derive(Default)]
struct Accounts {
    by_id: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<Accounts>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        if accounts.by_email.contains_key(&account.email) {
            return Err(DomainError::Duplicate {
                resource: "account".to_string(),
            });
        }

        accounts.by_email.insert(account.email.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .by_email
            .get(&Account::normalize_email(email))
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut accounts = self.accounts.write().await;
        match accounts.by_id.get_mut(&id) {
            Some(account) => {
                account.replace_password_hash(password_hash.to_string(), changed_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
