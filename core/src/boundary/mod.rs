//! Framework-independent request boundary
//!
//! Turns a raw JSON body into a call on the [`AuthorityFacade`] and the result
//! into a status code plus JSON body. Transport wiring is left to the host.

mod request;
mod response;

pub use request::{parse_request, BoundaryRequest, RefreshTokenRequest, ResetPasswordRequest};
pub use response::{into_response, BoundaryResponse, Operation, INTERNAL_ERROR_MESSAGE};

use crate::domain::entities::token::TokenPair;
use crate::domain::value_objects::{Acknowledged, AuthFailure, AuthOutcome};
use crate::repositories::{AccountRepository, TokenRepository};
use crate::services::authority::AuthorityFacade;
use crate::services::password::PasswordHasher;

/// `{token, newPassword}` → `{success}`
pub async fn handle_reset_password<T, A, H>(
    facade: &AuthorityFacade<T, A, H>,
    body: &[u8],
) -> BoundaryResponse
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    let operation = Operation::ResetPassword;
    let request: ResetPasswordRequest = match parse_request(body) {
        Ok(request) => request,
        Err(e) => {
            let outcome: AuthOutcome<Acknowledged> = AuthFailure::validation(e).into();
            return into_response(operation, Ok(outcome));
        }
    };

    let result = facade
        .reset_password(
            request.token.as_deref().unwrap_or_default(),
            request.new_password.as_deref().unwrap_or_default(),
        )
        .await;
    into_response(operation, result)
}

/// `{refreshToken}` → `{success, accessToken, refreshToken, ...}`
pub async fn handle_refresh_token<T, A, H>(
    facade: &AuthorityFacade<T, A, H>,
    body: &[u8],
) -> BoundaryResponse
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    let operation = Operation::RefreshAccessToken;
    let request: RefreshTokenRequest = match parse_request(body) {
        Ok(request) => request,
        Err(e) => {
            let outcome: AuthOutcome<TokenPair> = AuthFailure::validation(e).into();
            return into_response(operation, Ok(outcome));
        }
    };

    let result = facade
        .refresh_access_token(request.refresh_token.as_deref().unwrap_or_default())
        .await;
    into_response(operation, result)
}
