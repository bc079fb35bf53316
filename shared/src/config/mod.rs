//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Token lifetimes, rotation, password policy and hashing
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, HashingConfig, PasswordPolicyConfig, TokenConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Token, password and hashing configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            auth: AuthConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Missing or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            auth: AuthConfig::from_env(),
            database: DatabaseConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Validate the configuration for the current environment
    ///
    /// Returns a list of human readable problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = self.auth.validate();
        if self.environment.is_production() && self.auth.tokens.is_using_default_secret() {
            problems.push("JWT secret must be changed in production".to_string());
        }
        problems
    }
}

/// Read an environment variable and parse it, falling back to `default`
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
