//! Entry points handed to the request boundary
//!
//! The facade forwards to the credential authority and records how each call
//! ended. Rejection reasons only ever reach the log.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::domain::entities::token::TokenPair;
use crate::domain::value_objects::{Acknowledged, AuthOutcome, FailureKind};
use crate::errors::DomainResult;
use crate::repositories::{AccountRepository, TokenRepository};
use crate::services::credential::CredentialAuthority;
use crate::services::password::{BcryptPasswordHasher, PasswordHasher};

pub struct AuthorityFacade<T, A, H = BcryptPasswordHasher>
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    authority: Arc<CredentialAuthority<T, A, H>>,
}

impl<T, A, H> Clone for AuthorityFacade<T, A, H>
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    fn clone(&self) -> Self {
        Self {
            authority: Arc::clone(&self.authority),
        }
    }
}

impl<T, A, H> AuthorityFacade<T, A, H>
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    pub fn new(authority: Arc<CredentialAuthority<T, A, H>>) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &Arc<CredentialAuthority<T, A, H>> {
        &self.authority
    }

    #[instrument(name = "reset_password", skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> DomainResult<AuthOutcome<Acknowledged>> {
        let result = self.authority.reset_password(token, new_password).await;
        log_outcome("reset_password", &result);
        result
    }

    #[instrument(name = "refresh_access_token", skip_all)]
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> DomainResult<AuthOutcome<TokenPair>> {
        let result = self.authority.refresh_access_token(refresh_token).await;
        log_outcome("refresh_access_token", &result);
        result
    }
}

fn log_outcome<T>(operation: &'static str, result: &DomainResult<AuthOutcome<T>>) {
    match result {
        Ok(AuthOutcome::Success(_)) => info!(operation, "Operation succeeded"),
        Ok(AuthOutcome::Failure(failure)) => match &failure.kind {
            FailureKind::Authentication(reason) => {
                warn!(operation, reason = %reason, "Token rejected")
            }
            FailureKind::Validation(error) => {
                info!(operation, error = %error, "Request failed validation")
            }
            FailureKind::Policy(violation) => {
                info!(operation, violation = %violation, "Password rejected by policy")
            }
            FailureKind::InvalidCredentials => info!(operation, "Invalid credentials"),
        },
        Err(e) => error!(operation, error = %e, "Operation failed"),
    }
}
