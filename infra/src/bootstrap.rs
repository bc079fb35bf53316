//! Assembling a ready-to-use authority from configuration

use std::sync::Arc;

use ca_core::repositories::{AccountRepository, TokenRepository};
use ca_core::services::password::{BcryptPasswordHasher, PasswordHasher};
use ca_core::services::token::{TokenCleanupConfig, TokenCleanupService};
use ca_core::services::{AuthorityFacade, CredentialAuthority};
use ca_shared::config::{AppConfig, Environment};

use crate::memory::{InMemoryAccountRepository, InMemoryTokenRepository};
use crate::InfrastructureError;

pub type InMemoryAuthority = CredentialAuthority<InMemoryTokenRepository, InMemoryAccountRepository>;

/// Loads `.env` files and the environment, then validates the result
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let problems = config.validate();
    if !problems.is_empty() {
        return Err(InfrastructureError::Config(problems.join("; ")));
    }

    tracing::info!(environment = %config.environment, "Configuration loaded");
    Ok(config)
}

/// Builds an authority over in-process stores
pub fn in_memory_authority(config: &AppConfig) -> Arc<InMemoryAuthority> {
    Arc::new(CredentialAuthority::new(
        Arc::new(InMemoryTokenRepository::new()),
        Arc::new(InMemoryAccountRepository::new()),
        BcryptPasswordHasher::from_config(&config.auth.hashing),
        &config.auth,
    ))
}

/// Builds an authority over the MySQL stores behind `pool`
#[cfg(feature = "mysql")]
pub fn mysql_authority(
    pool: &crate::database::DatabasePool,
    config: &AppConfig,
) -> Arc<CredentialAuthority<crate::database::MySqlTokenRepository, crate::database::MySqlAccountRepository>>
{
    use crate::database::{MySqlAccountRepository, MySqlTokenRepository};

    Arc::new(CredentialAuthority::new(
        Arc::new(MySqlTokenRepository::new(pool.get_pool().clone())),
        Arc::new(MySqlAccountRepository::new(pool.get_pool().clone())),
        BcryptPasswordHasher::from_config(&config.auth.hashing),
        &config.auth,
    ))
}

/// Wraps an authority in the facade handed to request handlers
pub fn facade<T, A, H>(authority: Arc<CredentialAuthority<T, A, H>>) -> AuthorityFacade<T, A, H>
where
    T: TokenRepository,
    A: AccountRepository,
    H: PasswordHasher,
{
    AuthorityFacade::new(authority)
}

/// Starts periodic removal of spent and expired tokens
pub fn spawn_token_cleanup<T, A, H>(
    authority: &CredentialAuthority<T, A, H>,
    config: TokenCleanupConfig,
) -> Option<tokio::task::JoinHandle<()>>
where
    T: TokenRepository + 'static,
    A: AccountRepository,
    H: PasswordHasher,
{
    Arc::new(TokenCleanupService::new(authority.token_store(), config)).start_background_task()
}
