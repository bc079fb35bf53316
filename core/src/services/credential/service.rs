//! Credential authority implementation

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

use ca_shared::config::{AuthConfig, TokenConfig};

use crate::domain::entities::account::Account;
use crate::domain::entities::token::{Claims, IssuedToken, TokenKind, TokenPair, TokenVerdict};
use crate::domain::value_objects::{Acknowledged, AuthFailure, AuthOutcome};
use crate::errors::{DomainError, DomainResult, TokenError, TokenRejection, ValidationError};
use crate::repositories::{AccountRepository, TokenRepository};
use crate::services::password::{BcryptPasswordHasher, PasswordHasher, PasswordPolicy};
use crate::services::token::{AccessTokenSigner, TokenStore, TokenValidator};

/// Returns a validation failure from the enclosing operation if `value` is empty
macro_rules! require {
    ($value:expr, $field:literal) => {
        if $value.is_empty() {
            return Ok(AuthFailure::validation(ValidationError::required($field)).into());
        }
    };
}

/// Owns credential and session state changes
///
/// Every operation returns `Ok(AuthOutcome)` for expected failures (missing
/// input, rejected token, weak password) and `Err(DomainError)` only for
/// faults such as an unreachable store.
pub struct CredentialAuthority<T, A, H = BcryptPasswordHasher>
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    accounts: Arc<A>,
    store: Arc<TokenStore<T>>,
    validator: TokenValidator<T>,
    signer: AccessTokenSigner,
    hasher: H,
    policy: PasswordPolicy,
    config: TokenConfig,
}

impl<T, A, H> CredentialAuthority<T, A, H>
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    pub fn new(tokens: Arc<T>, accounts: Arc<A>, hasher: H, config: &AuthConfig) -> Self {
        let store = Arc::new(TokenStore::new(tokens));
        Self {
            accounts,
            validator: TokenValidator::new(store.clone()),
            store,
            signer: AccessTokenSigner::new(&config.tokens),
            hasher,
            policy: PasswordPolicy::new(config.password.clone()),
            config: config.tokens.clone(),
        }
    }

    /// The token store shared with the validator, e.g. for a cleanup task
    pub fn token_store(&self) -> Arc<TokenStore<T>> {
        self.store.clone()
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Creates an account with an initial password
    pub async fn register_account(
        &self,
        email: &str,
        password: &str,
    ) -> DomainResult<AuthOutcome<Account>> {
        require!(email.trim(), "email");
        require!(password, "password");

        if let Err(violation) = self.policy.check(password) {
            return Ok(AuthFailure::policy(violation).into());
        }

        let password_hash = self.hasher.hash(password).await?;
        match self.accounts.create(Account::new(email, password_hash)).await {
            Ok(account) => {
                info!(account_id = %account.id, "Account registered");
                Ok(AuthOutcome::Success(account))
            }
            Err(DomainError::Duplicate { .. }) => Ok(AuthFailure::validation(
                ValidationError::AlreadyRegistered {
                    field: "email".to_string(),
                },
            )
            .into()),
            Err(e) => Err(e),
        }
    }

    /// Issues a password reset token for the account registered under `email`
    ///
    /// Returns `None` for unknown addresses. Earlier reset tokens of the
    /// account are revoked so only the newest one works. Delivering the value
    /// to the account owner is up to the caller.
    pub async fn request_password_reset(&self, email: &str) -> DomainResult<Option<IssuedToken>> {
        let account = match self.accounts.find_by_email(email).await? {
            Some(account) => account,
            None => {
                debug!("Password reset requested for unknown email");
                return Ok(None);
            }
        };

        self.store
            .revoke_subject_tokens(account.id, TokenKind::PasswordReset)
            .await?;
        let issued = self
            .store
            .issue(
                TokenKind::PasswordReset,
                account.id,
                Duration::seconds(self.config.reset_token_ttl_secs),
            )
            .await?;

        info!(account_id = %account.id, token_id = %issued.token.id, "Password reset token issued");
        Ok(Some(issued))
    }

    /// Sets a new password using a single-use reset token
    ///
    /// On success the token is consumed, the hash replaced and every refresh
    /// token of the account revoked. The token is consumed only after the new
    /// password has passed the policy and been hashed, so a rejected password
    /// leaves the token usable.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> DomainResult<AuthOutcome<Acknowledged>> {
        require!(token, "token");
        require!(new_password, "newPassword");

        if let TokenVerdict::Rejected(reason) =
            self.validator.validate(token, TokenKind::PasswordReset).await?
        {
            return Ok(AuthFailure::token_rejected(reason).into());
        }

        if let Err(violation) = self.policy.check(new_password) {
            return Ok(AuthFailure::policy(violation).into());
        }
        let password_hash = self.hasher.hash(new_password).await?;

        // only the caller that wins the consume writes a hash
        let consumed = match self.store.consume(token, TokenKind::PasswordReset).await? {
            TokenVerdict::Accepted(consumed) => consumed,
            TokenVerdict::Rejected(reason) => {
                return Ok(AuthFailure::token_rejected(reason).into());
            }
        };
        let account_id = consumed.subject_id;
        let changed_at = consumed.consumed_at.unwrap_or_else(Utc::now);

        let updated = match self
            .accounts
            .update_password_hash(account_id, &password_hash, changed_at)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                self.release(&consumed.token_hash, changed_at).await;
                return Err(e);
            }
        };
        if !updated {
            warn!(account_id = %account_id, "Reset token belongs to a missing account");
            self.release(&consumed.token_hash, changed_at).await;
            return Ok(AuthFailure::token_rejected(TokenRejection::NotFound).into());
        }

        // Sessions issued from here on see the new `password_changed_at` and
        // discard themselves; older refresh tokens are refused by issue time
        // even if this revocation fails.
        let revoked = match self
            .store
            .revoke_subject_tokens(account_id, TokenKind::RefreshToken)
            .await
        {
            Ok(revoked) => revoked,
            Err(e) => {
                error!(account_id = %account_id, error = %e, "Failed to revoke refresh tokens after password reset");
                0
            }
        };

        // a newer reset request may still be outstanding
        if let Err(e) = self
            .store
            .revoke_subject_tokens(account_id, TokenKind::PasswordReset)
            .await
        {
            warn!(account_id = %account_id, error = %e, "Failed to revoke remaining reset tokens");
        }

        info!(
            account_id = %account_id,
            refresh_tokens_revoked = revoked,
            "Password reset completed"
        );
        Ok(AuthOutcome::Success(Acknowledged {}))
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// With rotation enabled the presented token is consumed and a new one
    /// is returned; otherwise the same refresh token comes back.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> DomainResult<AuthOutcome<TokenPair>> {
        require!(refresh_token, "refreshToken");

        let token = match self
            .validator
            .validate(refresh_token, TokenKind::RefreshToken)
            .await?
        {
            TokenVerdict::Accepted(token) => token,
            TokenVerdict::Rejected(TokenRejection::AlreadyConsumed) => {
                self.handle_refresh_reuse(refresh_token).await?;
                return Ok(AuthFailure::token_rejected(TokenRejection::AlreadyConsumed).into());
            }
            TokenVerdict::Rejected(reason) => {
                return Ok(AuthFailure::token_rejected(reason).into());
            }
        };

        let account = match self.accounts.find_by_id(token.subject_id).await? {
            Some(account) => account,
            None => {
                warn!(account_id = %token.subject_id, "Refresh token belongs to a missing account");
                return Ok(AuthFailure::token_rejected(TokenRejection::NotFound).into());
            }
        };

        if account.password_changed_since(token.issued_at) {
            warn!(account_id = %account.id, token_id = %token.id, "Refresh token predates the last password change");
            return Ok(AuthFailure::token_rejected(TokenRejection::Expired).into());
        }

        if !self.config.rotate_refresh_tokens {
            let access_token = self.signer.sign(token.subject_id)?;
            return Ok(AuthOutcome::Success(TokenPair::new(
                access_token,
                refresh_token.to_string(),
                self.signer.ttl_secs(),
                token.time_until_expiration().num_seconds(),
            )));
        }

        let consumed = match self.store.consume(refresh_token, TokenKind::RefreshToken).await? {
            TokenVerdict::Accepted(consumed) => consumed,
            TokenVerdict::Rejected(reason) => {
                return Ok(AuthFailure::token_rejected(reason).into());
            }
        };

        match self.issue_session(&account).await? {
            Some(pair) => {
                debug!(account_id = %account.id, rotated = %consumed.id, "Refresh token rotated");
                Ok(AuthOutcome::Success(pair))
            }
            None => Ok(AuthFailure::token_rejected(TokenRejection::Expired).into()),
        }
    }

    /// Starts a session from an email and password
    pub async fn start_session(
        &self,
        email: &str,
        password: &str,
    ) -> DomainResult<AuthOutcome<TokenPair>> {
        require!(email.trim(), "email");
        require!(password, "password");

        let account = match self.accounts.find_by_email(email).await? {
            Some(account) => account,
            None => return Ok(AuthFailure::invalid_credentials().into()),
        };

        if !self.hasher.verify(password, &account.password_hash).await? {
            debug!(account_id = %account.id, "Login with wrong password");
            return Ok(AuthFailure::invalid_credentials().into());
        }

        match self.issue_session(&account).await? {
            Some(pair) => {
                info!(account_id = %account.id, "Session started");
                Ok(AuthOutcome::Success(pair))
            }
            None => Ok(AuthFailure::invalid_credentials().into()),
        }
    }

    /// Ends a session by consuming its refresh token
    pub async fn end_session(&self, refresh_token: &str) -> DomainResult<AuthOutcome<Acknowledged>> {
        require!(refresh_token, "refreshToken");

        if !TokenValidator::<T>::is_well_formed(refresh_token) {
            return Ok(AuthFailure::token_rejected(TokenRejection::NotFound).into());
        }

        match self.store.consume(refresh_token, TokenKind::RefreshToken).await? {
            TokenVerdict::Accepted(token) => {
                info!(account_id = %token.subject_id, "Session ended");
                Ok(AuthOutcome::Success(Acknowledged {}))
            }
            TokenVerdict::Rejected(reason) => Ok(AuthFailure::token_rejected(reason).into()),
        }
    }

    /// Checks an access token
    ///
    /// Tokens issued before the account's last password change are refused
    /// even if their signature and expiry are fine.
    pub async fn verify_access_token(&self, access_token: &str) -> DomainResult<AuthOutcome<Claims>> {
        require!(access_token, "accessToken");

        let claims = match self.signer.verify(access_token) {
            Ok(claims) => claims,
            Err(DomainError::Token(TokenError::AccessTokenExpired)) => {
                return Ok(AuthFailure::token_rejected(TokenRejection::Expired).into());
            }
            Err(DomainError::Token(
                TokenError::InvalidAccessToken | TokenError::AccessTokenNotYetValid,
            )) => {
                return Ok(AuthFailure::token_rejected(TokenRejection::NotFound).into());
            }
            Err(e) => return Err(e),
        };

        let account_id = match claims.subject_id() {
            Ok(id) => id,
            Err(_) => return Ok(AuthFailure::token_rejected(TokenRejection::NotFound).into()),
        };
        let account = match self.accounts.find_by_id(account_id).await? {
            Some(account) => account,
            None => return Ok(AuthFailure::token_rejected(TokenRejection::NotFound).into()),
        };

        if account.password_changed_since(claims.issued_at()) {
            return Ok(AuthFailure::token_rejected(TokenRejection::Expired).into());
        }

        Ok(AuthOutcome::Success(claims))
    }

    /// Issues a token pair for `account` as it was read by the caller
    ///
    /// Returns `None` if the password changed while the pair was being
    /// issued. The new refresh token is then spent before anyone sees it,
    /// since the reset that changed the password may have revoked the
    /// account's refresh tokens before this one was stored.
    async fn issue_session(&self, account: &Account) -> DomainResult<Option<TokenPair>> {
        let refresh = self
            .store
            .issue(
                TokenKind::RefreshToken,
                account.id,
                Duration::seconds(self.config.refresh_token_ttl_secs),
            )
            .await?;

        let current = self.accounts.find_by_id(account.id).await?;
        if current.map(|a| a.password_changed_at) != Some(account.password_changed_at) {
            self.store
                .consume(&refresh.value, TokenKind::RefreshToken)
                .await?;
            warn!(account_id = %account.id, "Password changed while issuing a session, discarded it");
            return Ok(None);
        }

        let access_token = self.signer.sign(account.id)?;
        Ok(Some(TokenPair::new(
            access_token,
            refresh.value,
            self.signer.ttl_secs(),
            self.config.refresh_token_ttl_secs,
        )))
    }

    /// A consumed refresh token came back; treat the session as stolen
    async fn handle_refresh_reuse(&self, refresh_token: &str) -> DomainResult<()> {
        if !self.config.revoke_on_refresh_reuse {
            return Ok(());
        }

        if let Some(token) = self.store.lookup(refresh_token).await? {
            let revoked = self
                .store
                .revoke_subject_tokens(token.subject_id, TokenKind::RefreshToken)
                .await?;
            warn!(
                account_id = %token.subject_id,
                token_id = %token.id,
                revoked,
                "Consumed refresh token replayed, revoked all refresh tokens of the account"
            );
        }

        Ok(())
    }

    async fn release(&self, token_hash: &str, consumed_at: chrono::DateTime<Utc>) {
        match self.store.repository().release_token(token_hash, consumed_at).await {
            Ok(true) => debug!("Released reset token after failed password update"),
            Ok(false) => warn!("Reset token changed before it could be released"),
            Err(e) => error!(error = %e, "Failed to release reset token"),
        }
    }
}
