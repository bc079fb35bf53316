//! # Infrastructure Layer
//!
//! Concrete stores and process setup for the credential authority.
//!
//! ## Architecture
//!
//! - **Memory**: in-process token and account stores with per-token locking
//! - **Database**: MySQL implementations using SQLx, row-locked consumes
//! - **Telemetry**: tracing subscriber configured from `LoggingConfig`
//! - **Bootstrap**: configuration loading and authority assembly
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use ca_core::errors::*;

pub mod bootstrap;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

pub mod memory;
pub mod telemetry;

pub use bootstrap::{facade, in_memory_authority, load_config, spawn_token_cleanup, InMemoryAuthority};
pub use memory::{InMemoryAccountRepository, InMemoryTokenRepository};
pub use telemetry::init_tracing;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
