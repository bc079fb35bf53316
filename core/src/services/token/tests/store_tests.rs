//! Tests for the token store

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{TokenKind, TokenVerdict};
use crate::errors::{DomainError, TokenRejection};
use crate::repositories::{MockTokenRepository, TokenRepository};
use crate::services::token::{
    generate_token_value, hash_token_value, TokenStore, TOKEN_VALUE_LENGTH,
};

fn store() -> (Arc<MockTokenRepository>, TokenStore<MockTokenRepository>) {
    let repository = Arc::new(MockTokenRepository::new());
    (repository.clone(), TokenStore::new(repository))
}

#[test]
fn test_generated_values_are_url_safe_and_unique() {
    let values: HashSet<String> = (0..200).map(|_| generate_token_value()).collect();

    assert_eq!(values.len(), 200);
    for value in &values {
        assert_eq!(value.len(), TOKEN_VALUE_LENGTH);
        assert!(value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}

#[test]
fn test_hash_is_deterministic_hex() {
    let hash = hash_token_value("abc");
    assert_eq!(hash, hash_token_value("abc"));
    assert_ne!(hash, hash_token_value("abd"));
    assert_eq!(hash.len(), 64);
    assert_eq!(
        hash,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn test_issue_stores_only_the_hash() {
    let (repository, store) = store();
    let subject_id = Uuid::new_v4();

    let issued = store
        .issue(TokenKind::PasswordReset, subject_id, Duration::minutes(30))
        .await
        .unwrap();

    assert_eq!(issued.token.subject_id, subject_id);
    assert_eq!(issued.token.token_hash, hash_token_value(&issued.value));
    assert!(repository.find_by_hash(&issued.value).await.unwrap().is_none());
    assert!(repository
        .find_by_hash(&issued.token.token_hash)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_lookup_does_not_consume() {
    let (_, store) = store();
    let issued = store
        .issue(TokenKind::RefreshToken, Uuid::new_v4(), Duration::days(7))
        .await
        .unwrap();

    let found = store.lookup(&issued.value).await.unwrap().unwrap();
    assert!(!found.is_consumed());
    assert!(store.lookup("unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_consume_exactly_once() {
    let (_, store) = store();
    let issued = store
        .issue(TokenKind::PasswordReset, Uuid::new_v4(), Duration::minutes(30))
        .await
        .unwrap();

    let first = store
        .consume(&issued.value, TokenKind::PasswordReset)
        .await
        .unwrap();
    assert!(first.is_accepted());

    let second = store
        .consume(&issued.value, TokenKind::PasswordReset)
        .await
        .unwrap();
    assert_eq!(
        second,
        TokenVerdict::Rejected(TokenRejection::AlreadyConsumed)
    );
}

#[tokio::test]
async fn test_consume_rejections() {
    let (_, store) = store();
    let issued = store
        .issue(TokenKind::RefreshToken, Uuid::new_v4(), Duration::days(7))
        .await
        .unwrap();

    assert_eq!(
        store
            .consume(&issued.value, TokenKind::PasswordReset)
            .await
            .unwrap(),
        TokenVerdict::Rejected(TokenRejection::KindMismatch)
    );
    assert_eq!(
        store
            .consume_at(
                &issued.value,
                TokenKind::RefreshToken,
                Utc::now() + Duration::days(8)
            )
            .await
            .unwrap(),
        TokenVerdict::Rejected(TokenRejection::Expired)
    );
    assert_eq!(
        store
            .consume(&generate_token_value(), TokenKind::RefreshToken)
            .await
            .unwrap(),
        TokenVerdict::Rejected(TokenRejection::NotFound)
    );

    // none of the rejected attempts used the token up
    assert!(store
        .consume(&issued.value, TokenKind::RefreshToken)
        .await
        .unwrap()
        .is_accepted());
}

#[tokio::test]
async fn test_revoke_and_active_tokens() {
    let (_, store) = store();
    let subject_id = Uuid::new_v4();

    for _ in 0..3 {
        store
            .issue(TokenKind::RefreshToken, subject_id, Duration::days(7))
            .await
            .unwrap();
    }
    store
        .issue(TokenKind::PasswordReset, subject_id, Duration::minutes(30))
        .await
        .unwrap();

    assert_eq!(
        store
            .active_tokens(subject_id, TokenKind::RefreshToken)
            .await
            .unwrap()
            .len(),
        3
    );
    assert_eq!(
        store
            .revoke_subject_tokens(subject_id, TokenKind::RefreshToken)
            .await
            .unwrap(),
        3
    );
    assert!(store
        .active_tokens(subject_id, TokenKind::RefreshToken)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        store
            .active_tokens(subject_id, TokenKind::PasswordReset)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_storage_failure_is_a_fault() {
    let (repository, store) = store();
    repository.fail_writes();

    let result = store
        .issue(TokenKind::PasswordReset, Uuid::new_v4(), Duration::minutes(30))
        .await;
    assert!(matches!(result, Err(DomainError::Storage { .. })));
}
