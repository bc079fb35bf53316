//! Configurable password strength policy

use ca_shared::config::PasswordPolicyConfig;

use crate::errors::PasswordPolicyError;

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/~`'\"\\";

/// Checks candidate passwords against a `PasswordPolicyConfig`
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    config: PasswordPolicyConfig,
}

impl PasswordPolicy {
    pub fn new(config: PasswordPolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PasswordPolicyConfig {
        &self.config
    }

    /// Returns the first rule `password` breaks, if any
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyError> {
        let config = &self.config;

        if password.chars().count() < config.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: config.min_length,
            });
        }
        // bcrypt works on bytes
        if password.len() > config.max_length {
            return Err(PasswordPolicyError::TooLong {
                max: config.max_length,
            });
        }
        if config.require_uppercase && !password.chars().any(char::is_uppercase) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if config.require_lowercase && !password.chars().any(char::is_lowercase) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if config.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if config.require_special && !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err(PasswordPolicyError::MissingSpecialChar);
        }

        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(PasswordPolicyConfig::default())
    }
}
