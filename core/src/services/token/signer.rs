//! HS256 access token signing and verification

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use ca_shared::config::TokenConfig;

use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, TokenError};

/// Signs short-lived access tokens and checks them on the way back in
#[derive(Clone)]
pub struct AccessTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl_secs: i64,
}

impl std::fmt::Debug for AccessTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenSigner")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl AccessTokenSigner {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl_secs: config.access_token_ttl_secs,
        }
    }

    /// Access token lifetime in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Signs a new access token for `subject_id`
    pub fn sign(&self, subject_id: Uuid) -> Result<String, DomainError> {
        let claims = Claims::new_access_token(
            subject_id,
            Duration::seconds(self.ttl_secs),
            self.issuer.clone(),
            self.audience.clone(),
        );
        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::SigningFailed))
    }

    /// Verifies an access token and returns its claims
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::Token(TokenError::AccessTokenExpired),
                ErrorKind::ImmatureSignature => {
                    DomainError::Token(TokenError::AccessTokenNotYetValid)
                }
                _ => DomainError::Token(TokenError::InvalidAccessToken),
            })?;

        Ok(token_data.claims)
    }
}
