//! Token cleanup service for periodic removal of spent and expired tokens
//!
//! Consumed and expired records are useless for authentication but are kept
//! for a grace period so replays can still be told apart from unknown values.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

use super::store::TokenStore;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// How long spent or expired tokens are kept (in seconds)
    pub grace_period_secs: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,           // Run every hour
            grace_period_secs: 7 * 24 * 3600, // Keep spent tokens for 7 days
            enabled: true,
        }
    }
}

/// Service for cleaning up spent and expired tokens
pub struct TokenCleanupService<R: TokenRepository + 'static> {
    store: Arc<TokenStore<R>>,
    config: TokenCleanupConfig,
}

impl<R: TokenRepository + 'static> TokenCleanupService<R> {
    pub fn new(store: Arc<TokenStore<R>>, config: TokenCleanupConfig) -> Self {
        Self { store, config }
    }

    /// Run a single cleanup cycle
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting token cleanup cycle");

        let mut result = CleanupResult::default();
        let cutoff = Utc::now() - Duration::seconds(self.config.grace_period_secs);

        match self.store.purge_stale(cutoff).await {
            Ok(count) => {
                result.stale_tokens_deleted = count;
            }
            Err(e) => {
                error!("Failed to cleanup stale tokens: {}", e);
                result.errors.push(format!("Token cleanup error: {}", e));
            }
        }

        info!(
            deleted = result.stale_tokens_deleted,
            cutoff = %cutoff,
            "Token cleanup completed"
        );

        Ok(result)
    }

    /// Start the cleanup service as a background task
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Token cleanup cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of spent or expired tokens deleted
    pub stale_tokens_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
