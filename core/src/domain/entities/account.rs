//! Account entity holding credential state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account whose password can be reset and whose sessions are refreshable
///
/// The set of active refresh tokens is not stored here; it is owned by the
/// token store and queried by subject ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,

    /// Normalized (trimmed, lowercase) email address
    pub email: String,

    /// bcrypt hash of the current password, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Last time the password hash was replaced through a reset
    pub password_changed_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Creates a new account from an already hashed password
    pub fn new(email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: Self::normalize_email(email),
            password_hash,
            created_at: now,
            updated_at: now,
            password_changed_at: None,
        }
    }

    /// Lookup form of an email address
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Replaces the password hash and stamps the change
    pub fn replace_password_hash(&mut self, password_hash: String, changed_at: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.password_changed_at = Some(changed_at);
        self.updated_at = changed_at;
    }

    /// Whether the password was replaced after `issued_at`
    ///
    /// Credentials issued before the last change no longer belong to the
    /// account's owner.
    pub fn password_changed_since(&self, issued_at: DateTime<Utc>) -> bool {
        self.password_changed_at
            .map_or(false, |changed_at| issued_at < changed_at)
    }
}
