//! Environment detection and logging configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Get environment from the `ENVIRONMENT` (or `APP_ENV`) variable
    pub fn from_env() -> Self {
        env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Name of the dotenv file loaded for this environment
    pub fn env_file(&self) -> &'static str {
        match self {
            Environment::Development => ".env.development",
            Environment::Staging => ".env.staging",
            Environment::Production => ".env.production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive (e.g. `info`, `ca_core=debug,sqlx=warn`)
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Include module path and line in log lines
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: default_log_format(),
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Logging defaults for an environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                source_location: true,
            },
            Environment::Staging => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                source_location: false,
            },
            Environment::Production => Self {
                level: String::from("warn"),
                format: LogFormat::Json,
                source_location: false,
            },
        }
    }

    /// Environment defaults overridden by `LOG_LEVEL` / `LOG_FORMAT`
    pub fn from_env(environment: Environment) -> Self {
        let defaults = Self::for_environment(environment);
        Self {
            level: env::var("LOG_LEVEL").unwrap_or(defaults.level),
            format: super::env_or("LOG_FORMAT", defaults.format),
            source_location: defaults.source_location,
        }
    }
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("invalid".parse::<Environment>().is_err());
    }

    #[test]
    fn test_logging_config_for_environment() {
        let dev_log = LoggingConfig::for_environment(Environment::Development);
        assert_eq!(dev_log.level, "debug");
        assert_eq!(dev_log.format, LogFormat::Pretty);
        assert!(dev_log.source_location);

        let prod_log = LoggingConfig::for_environment(Environment::Production);
        assert_eq!(prod_log.level, "warn");
        assert_eq!(prod_log.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
