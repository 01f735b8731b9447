//! Account records
//!
//! An account is owned and persisted by an [`AccountRepository`](crate::repositories::AccountRepository).
//! The gate receives a copy, may change its counters, and hands it back to the
//! repository to be saved.
//!
//! | Field                | Type               | Description                                        |
//! | -------------------- | ------------------ | -------------------------------------------------- |
//! | `id`                 | `AccountId`        | Opaque, stable identifier.                         |
//! | `username`           | `String`           | Unique login name.                                 |
//! | `password_hash`      | `String`           | Opaque hash, only ever passed to a verifier.       |
//! | `is_active`          | `bool`             | Inactive accounts can never log in.                |
//! | `two_factor_enabled` | `bool`             | Whether a second factor is required.               |
//! | `failed_attempts`    | `u32`              | Consecutive failed password checks.                |
//! | `last_attempt_at`    | `Option<DateTime>` | Last password check, successful or not.            |
//! | `created_at`         | `DateTime`         | Creation timestamp.                                |
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, validate_prefixed_id},
};

/// A unique, stable identifier for an account
///
/// This value should be treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: &str) -> Self {
        AccountId(id.to_string())
    }

    pub fn new_random() -> Self {
        AccountId(generate_prefixed_id("acct"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this ID has the correct format for an account ID
    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "acct")
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub two_factor_enabled: bool,
    pub failed_attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn builder() -> AccountBuilder {
        AccountBuilder::default()
    }

    /// Count a failed password check made at `at`.
    pub fn record_failure(&mut self, at: DateTime<Utc>) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.last_attempt_at = Some(at);
    }

    /// Clear the failure counter after a fully successful login at `at`.
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.failed_attempts = 0;
        self.last_attempt_at = Some(at);
    }
}

pub struct AccountBuilder {
    id: Option<AccountId>,
    username: Option<String>,
    password_hash: Option<String>,
    is_active: bool,
    two_factor_enabled: bool,
    failed_attempts: u32,
    last_attempt_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
}

impl Default for AccountBuilder {
    fn default() -> Self {
        Self {
            id: None,
            username: None,
            password_hash: None,
            is_active: true,
            two_factor_enabled: false,
            failed_attempts: 0,
            last_attempt_at: None,
            created_at: None,
        }
    }
}

impl AccountBuilder {
    pub fn id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password_hash(mut self, password_hash: impl Into<String>) -> Self {
        self.password_hash = Some(password_hash.into());
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn two_factor_enabled(mut self, two_factor_enabled: bool) -> Self {
        self.two_factor_enabled = two_factor_enabled;
        self
    }

    pub fn failed_attempts(mut self, failed_attempts: u32) -> Self {
        self.failed_attempts = failed_attempts;
        self
    }

    pub fn last_attempt_at(mut self, last_attempt_at: Option<DateTime<Utc>>) -> Self {
        self.last_attempt_at = last_attempt_at;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn build(self) -> Result<Account, Error> {
        let username = self
            .username
            .filter(|u| !u.trim().is_empty())
            .ok_or(ValidationError::MissingField(
                "Username is required".to_string(),
            ))?;
        let password_hash = self.password_hash.ok_or(ValidationError::MissingField(
            "Password hash is required".to_string(),
        ))?;

        Ok(Account {
            id: self.id.unwrap_or_default(),
            username,
            password_hash,
            is_active: self.is_active,
            two_factor_enabled: self.two_factor_enabled,
            failed_attempts: self.failed_attempts,
            last_attempt_at: self.last_attempt_at,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}
