//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and schema migrations
//! - Token and account repositories

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::{MySqlAccountRepository, MySqlTokenRepository};
