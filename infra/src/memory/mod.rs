//! In-process stores
//!
//! Suitable for a single instance and for tests. Token records are locked
//! individually so consuming one token never waits on another.

mod account_repository;
mod token_repository;

pub use account_repository::InMemoryAccountRepository;
pub use token_repository::InMemoryTokenRepository;
