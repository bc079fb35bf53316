//! Shared configuration types for the credential authority workspace
//!
//! This crate provides the configuration consumed by the core services and
//! the infrastructure layer:
//! - Token lifetimes and rotation policy
//! - Password policy and hashing cost
//! - Database, environment and logging settings

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, HashingConfig, LogFormat,
    LoggingConfig, PasswordPolicyConfig, TokenConfig,
};
