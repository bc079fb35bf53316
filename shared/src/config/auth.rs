//! Token, password policy and hashing configuration

use serde::{Deserialize, Serialize};

use super::env_or;

const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// Token lifetime and rotation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Secret used to sign access tokens (HS256)
    pub jwt_secret: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: i64,

    /// Password reset token lifetime in seconds
    pub reset_token_ttl_secs: i64,

    /// Issue a new refresh token and consume the old one on every refresh
    #[serde(default = "default_true")]
    pub rotate_refresh_tokens: bool,

    /// Revoke all refresh tokens of a subject when a consumed one is replayed
    #[serde(default = "default_true")]
    pub revoke_on_refresh_reuse: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            issuer: String::from("credential-authority"),
            audience: String::from("credential-authority-api"),
            access_token_ttl_secs: 900,      // 15 minutes
            refresh_token_ttl_secs: 604_800, // 7 days
            reset_token_ttl_secs: 1_800,     // 30 minutes
            rotate_refresh_tokens: true,
            revoke_on_refresh_reuse: true,
        }
    }
}

impl TokenConfig {
    /// Create a new token configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_ttl_secs: env_or("ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl_secs),
            refresh_token_ttl_secs: env_or(
                "REFRESH_TOKEN_TTL_SECS",
                defaults.refresh_token_ttl_secs,
            ),
            reset_token_ttl_secs: env_or("RESET_TOKEN_TTL_SECS", defaults.reset_token_ttl_secs),
            rotate_refresh_tokens: env_or("ROTATE_REFRESH_TOKENS", defaults.rotate_refresh_tokens),
            revoke_on_refresh_reuse: env_or(
                "REVOKE_ON_REFRESH_REUSE",
                defaults.revoke_on_refresh_reuse,
            ),
        }
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Password strength policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordPolicyConfig {
    /// Minimum length in characters
    pub min_length: usize,

    /// Maximum length in bytes (bcrypt ignores input past 72 bytes)
    pub max_length: usize,

    #[serde(default = "default_true")]
    pub require_uppercase: bool,

    #[serde(default = "default_true")]
    pub require_lowercase: bool,

    #[serde(default = "default_true")]
    pub require_digit: bool,

    #[serde(default)]
    pub require_special: bool,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 72,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
        }
    }
}

impl PasswordPolicyConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_length: env_or("PASSWORD_MIN_LENGTH", defaults.min_length),
            max_length: env_or("PASSWORD_MAX_LENGTH", defaults.max_length),
            require_uppercase: env_or("PASSWORD_REQUIRE_UPPERCASE", defaults.require_uppercase),
            require_lowercase: env_or("PASSWORD_REQUIRE_LOWERCASE", defaults.require_lowercase),
            require_digit: env_or("PASSWORD_REQUIRE_DIGIT", defaults.require_digit),
            require_special: env_or("PASSWORD_REQUIRE_SPECIAL", defaults.require_special),
        }
    }

    /// A policy that only enforces length bounds
    pub fn length_only(min_length: usize) -> Self {
        Self {
            min_length,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
            ..Default::default()
        }
    }
}

/// Password hashing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HashingConfig {
    /// bcrypt work factor (4..=31)
    pub bcrypt_cost: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl HashingConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Token lifetimes and rotation policy
    #[serde(default)]
    pub tokens: TokenConfig,

    /// Password strength policy
    #[serde(default)]
    pub password: PasswordPolicyConfig,

    /// Password hashing settings
    #[serde(default)]
    pub hashing: HashingConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            tokens: TokenConfig::from_env(),
            password: PasswordPolicyConfig::from_env(),
            hashing: HashingConfig::from_env(),
        }
    }

    /// Check internal consistency of the settings
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.tokens.jwt_secret.len() < 32 {
            problems.push("JWT secret must be at least 32 bytes".to_string());
        }
        for (name, ttl) in [
            ("access token", self.tokens.access_token_ttl_secs),
            ("refresh token", self.tokens.refresh_token_ttl_secs),
            ("reset token", self.tokens.reset_token_ttl_secs),
        ] {
            if ttl <= 0 {
                problems.push(format!("{} lifetime must be positive", name));
            }
        }
        if self.password.min_length == 0 || self.password.min_length > self.password.max_length {
            problems.push("password length bounds are inconsistent".to_string());
        }
        if self.password.max_length > 72 {
            problems.push("password max length cannot exceed 72 bytes".to_string());
        }
        if !(4..=31).contains(&self.hashing.bcrypt_cost) {
            problems.push("bcrypt cost must be between 4 and 31".to_string());
        }

        problems
    }
}

fn default_true() -> bool {
    true
}
