//! Tracing subscriber setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ca_shared::config::{LogFormat, LoggingConfig};

use crate::InfrastructureError;

/// Installs the global subscriber described by `config`
///
/// `RUST_LOG` overrides the configured level when set. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| InfrastructureError::Config(format!("Invalid log level: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };

    result.map_err(|e| InfrastructureError::General(format!("Tracing already initialized: {}", e)))
}
