//! MySQL repository implementations

mod account_repository_impl;
mod token_repository_impl;

pub use account_repository_impl::MySqlAccountRepository;
pub use token_repository_impl::MySqlTokenRepository;

use sqlx::Row;

use ca_core::errors::DomainError;

/// Reads a column, turning decode failures into a storage fault
pub(crate) fn column<'r, T>(row: &'r sqlx::mysql::MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to get {}: {}", name, e)))
}

pub(crate) fn parse_uuid(value: &str, name: &str) -> Result<uuid::Uuid, DomainError> {
    uuid::Uuid::parse_str(value)
        .map_err(|e| DomainError::storage(format!("Invalid {} UUID: {}", name, e)))
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
