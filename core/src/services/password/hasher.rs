//! Password hashing behind a trait so tests and alternative schemes can swap it

use async_trait::async_trait;
use ca_shared::config::HashingConfig;

use crate::errors::{DomainError, DomainResult};

/// Slow, salted one-way password hashing
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    async fn hash(&self, password: &str) -> DomainResult<String>;

    /// Check a plaintext password against a stored hash
    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool>;
}

/// bcrypt hasher; work runs on the blocking thread pool
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_config(config: &HashingConfig) -> Self {
        Self::new(config.bcrypt_cost)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::Hashing {
                message: format!("hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Hashing {
                message: e.to_string(),
            })
    }

    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await
            .map_err(|e| DomainError::Hashing {
                message: format!("verification task failed: {}", e),
            })?;

        match result {
            Ok(matches) => Ok(matches),
            // a corrupt stored hash never matches
            Err(bcrypt::BcryptError::InvalidHash(_)) => Ok(false),
            Err(e) => Err(DomainError::Hashing {
                message: e.to_string(),
            }),
        }
    }
}
