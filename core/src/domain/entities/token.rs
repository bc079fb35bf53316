//! Token entities: stored reset/refresh tokens, access token claims and token pairs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenRejection;

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Password reset token expiration time (30 minutes)
pub const RESET_TOKEN_EXPIRY_MINUTES: i64 = 30;

/// What a stored token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Single-use proof that the account owner asked for a password reset
    PasswordReset,
    /// Longer-lived credential exchanged for access tokens
    RefreshToken,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::PasswordReset => "password_reset",
            TokenKind::RefreshToken => "refresh_token",
        }
    }

    /// Default lifetime for tokens of this kind
    pub fn default_ttl(&self) -> Duration {
        match self {
            TokenKind::PasswordReset => Duration::minutes(RESET_TOKEN_EXPIRY_MINUTES),
            TokenKind::RefreshToken => Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password_reset" => Ok(TokenKind::PasswordReset),
            "refresh_token" => Ok(TokenKind::RefreshToken),
            _ => Err(format!("Unknown token kind: {}", s)),
        }
    }
}

/// Stored token record
///
/// The raw token value is never stored; `token_hash` is the hex SHA-256 digest
/// of the value handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique identifier for the record
    pub id: Uuid,

    pub kind: TokenKind,

    /// Account this token belongs to
    pub subject_id: Uuid,

    /// Hashed token value, the lookup key
    pub token_hash: String,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Set once the token has been used or revoked
    pub consumed_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Creates a new, unconsumed token expiring `ttl` from now
    pub fn new(kind: TokenKind, subject_id: Uuid, token_hash: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            subject_id,
            token_hash,
            issued_at: now,
            expires_at: now + ttl,
            consumed_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// A token is valid if it hasn't expired and hasn't been consumed
    pub fn is_valid(&self) -> bool {
        !self.is_consumed() && !self.is_expired()
    }

    /// Checks whether this token may be used as `expected` at `now`
    ///
    /// Returns the first reason it may not, or `None` if it is usable.
    pub fn rejection(&self, expected: TokenKind, now: DateTime<Utc>) -> Option<TokenRejection> {
        if self.kind != expected {
            Some(TokenRejection::KindMismatch)
        } else if self.is_consumed() {
            Some(TokenRejection::AlreadyConsumed)
        } else if self.is_expired_at(now) {
            Some(TokenRejection::Expired)
        } else {
            None
        }
    }

    /// Check-and-set: marks the token consumed if it is usable as `expected`
    ///
    /// Callers must hold whatever lock makes this indivisible.
    pub fn try_consume(&mut self, expected: TokenKind, now: DateTime<Utc>) -> TokenVerdict {
        match self.rejection(expected, now) {
            Some(reason) => TokenVerdict::Rejected(reason),
            None => {
                self.consumed_at = Some(now);
                TokenVerdict::Accepted(self.clone())
            }
        }
    }

    /// Whether a sweep running at `cutoff` may delete this record
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.expires_at < cutoff || self.consumed_at.map_or(false, |at| at < cutoff)
    }

    /// Time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Result of validating or consuming a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Accepted(Token),
    Rejected(TokenRejection),
}

impl TokenVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TokenVerdict::Accepted(_))
    }

    pub fn rejection(&self) -> Option<TokenRejection> {
        match self {
            TokenVerdict::Accepted(_) => None,
            TokenVerdict::Rejected(reason) => Some(*reason),
        }
    }
}

/// A freshly issued token: the record plus the raw value to hand out once
#[derive(Clone)]
pub struct IssuedToken {
    pub value: String,
    pub token: Token,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("value", &"<redacted>")
            .field("token", &self.token)
            .finish()
    }
}

/// Claims structure for the JWT access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,

    pub iss: String,

    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issue time in microseconds, `iat` only has whole seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat_us: Option<i64>,
}

impl Claims {
    /// Creates access token claims valid for `ttl` from now
    pub fn new_access_token(
        subject_id: Uuid,
        ttl: Duration,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: subject_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
            iss: issuer.into(),
            aud: audience.into(),
            jti: Uuid::new_v4().to_string(),
            iat_us: Some(now.timestamp_micros()),
        }
    }

    /// Issue time at the finest precision the token carries
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.iat_us
            .and_then(DateTime::from_timestamp_micros)
            .or_else(|| DateTime::from_timestamp(self.iat, 0))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the account ID from the claims
    pub fn subject_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Token pair returned to the client on a successful refresh or login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            refresh_expires_in,
        }
    }
}
