//! Sessions being issued while a password reset completes

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use ca_core::domain::entities::token::{Token, TokenKind, TokenVerdict};
use ca_core::domain::value_objects::FailureKind;
use ca_core::errors::{DomainError, TokenRejection};
use ca_core::repositories::TokenRepository;
use ca_core::services::password::BcryptPasswordHasher;
use ca_core::services::CredentialAuthority;
use ca_infra::{InMemoryAccountRepository, InMemoryTokenRepository};

use common::{test_config, EMAIL, NEW_PASSWORD, PASSWORD};

/// Holds the next refresh token save until released
#[derive(Default)]
struct HeldSaves {
    inner: InMemoryTokenRepository,
    armed: AtomicBool,
    reached: Notify,
    release: Notify,
}

impl HeldSaves {
    fn hold_next_refresh_save(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TokenRepository for HeldSaves {
    async fn save_token(&self, token: Token) -> Result<Token, DomainError> {
        if token.kind == TokenKind::RefreshToken && self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.release.notified().await;
        }
        self.inner.save_token(token).await
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Token>, DomainError> {
        self.inner.find_by_hash(token_hash).await
    }

    async fn consume_token(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenVerdict, DomainError> {
        self.inner.consume_token(token_hash, kind, now).await
    }

    async fn release_token(
        &self,
        token_hash: &str,
        consumed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.inner.release_token(token_hash, consumed_at).await
    }

    async fn find_active_by_subject(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
    ) -> Result<Vec<Token>, DomainError> {
        self.inner.find_active_by_subject(subject_id, kind).await
    }

    async fn revoke_subject_tokens(
        &self,
        subject_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.inner.revoke_subject_tokens(subject_id, kind, now).await
    }

    async fn delete_stale_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        self.inner.delete_stale_tokens(cutoff).await
    }
}

type HeldAuthority = CredentialAuthority<HeldSaves, InMemoryAccountRepository>;

async fn held_authority() -> (Arc<HeldAuthority>, Arc<HeldSaves>, Uuid) {
    let config = test_config();
    let tokens = Arc::new(HeldSaves::default());
    let authority = Arc::new(CredentialAuthority::new(
        tokens.clone(),
        Arc::new(InMemoryAccountRepository::new()),
        BcryptPasswordHasher::from_config(&config.auth.hashing),
        &config.auth,
    ));
    let account = authority
        .register_account(EMAIL, PASSWORD)
        .await
        .unwrap()
        .into_data()
        .unwrap();
    (authority, tokens, account.id)
}

async fn reset_now(authority: &HeldAuthority) {
    let reset_token = authority
        .request_password_reset(EMAIL)
        .await
        .unwrap()
        .unwrap()
        .value;
    assert!(authority
        .reset_password(&reset_token, NEW_PASSWORD)
        .await
        .unwrap()
        .is_success());
}

#[tokio::test]
async fn refresh_in_flight_during_reset_is_discarded() {
    let (authority, tokens, account_id) = held_authority().await;
    let refresh_token = authority
        .start_session(EMAIL, PASSWORD)
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .refresh_token;

    tokens.hold_next_refresh_save();
    let refreshing = {
        let authority = Arc::clone(&authority);
        tokio::spawn(async move { authority.refresh_access_token(&refresh_token).await })
    };
    tokens.reached.notified().await;

    reset_now(&authority).await;
    tokens.release.notify_one();

    let outcome = refreshing.await.unwrap().unwrap();
    assert_eq!(
        outcome.failure().unwrap().rejection(),
        Some(TokenRejection::Expired)
    );
    assert_eq!(
        tokens
            .count_active_tokens(account_id, TokenKind::RefreshToken)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn login_with_old_password_during_reset_is_discarded() {
    let (authority, tokens, account_id) = held_authority().await;

    tokens.hold_next_refresh_save();
    let logging_in = {
        let authority = Arc::clone(&authority);
        tokio::spawn(async move { authority.start_session(EMAIL, PASSWORD).await })
    };
    tokens.reached.notified().await;

    reset_now(&authority).await;
    tokens.release.notify_one();

    let outcome = logging_in.await.unwrap().unwrap();
    assert_eq!(
        outcome.failure().unwrap().kind,
        FailureKind::InvalidCredentials
    );
    assert_eq!(
        tokens
            .count_active_tokens(account_id, TokenKind::RefreshToken)
            .await
            .unwrap(),
        0
    );

    // a session started after the reset is unaffected
    assert!(authority
        .start_session(EMAIL, NEW_PASSWORD)
        .await
        .unwrap()
        .is_success());
}
