//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use ca_infra::{in_memory_authority, InMemoryAuthority};
use ca_shared::config::{AppConfig, TokenConfig};

pub const EMAIL: &str = "grace@example.com";
pub const PASSWORD: &str = "FirstPassw0rd";
pub const NEW_PASSWORD: &str = "SecondPassw0rd";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.tokens = TokenConfig::new("integration-test-secret-of-32-bytes!");
    config.auth.hashing.bcrypt_cost = 4;
    config
}

/// An in-memory authority with one registered account
pub async fn authority() -> Arc<InMemoryAuthority> {
    authority_with(test_config()).await
}

pub async fn authority_with(config: AppConfig) -> Arc<InMemoryAuthority> {
    let authority = in_memory_authority(&config);
    let registered = authority
        .register_account(EMAIL, PASSWORD)
        .await
        .expect("register account");
    assert!(registered.is_success());
    authority
}
