//! Account lockout policy.
//!
//! An account is locked while it has at least `max_failed_attempts` failed
//! password checks on record and its last attempt falls inside the lockout
//! period. The counter itself lives on the [`Account`]; this module only
//! interprets it, so a lock expires on its own once the period elapses even
//! though the counter is not cleared until the next successful login.
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultgate_core::services::{LockoutConfig, LockoutPolicy};
//!
//! let policy = LockoutPolicy::new(LockoutConfig::default());
//! let status = policy.status(&account, Utc::now());
//! if status.is_locked {
//!     // reject before checking the password
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Account;

/// Configuration for lockout behavior.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Whether lockout is enforced at all
    pub enabled: bool,
    /// Failed attempts at which an account locks
    pub max_failed_attempts: u32,
    /// How long a lock lasts, measured from the last attempt
    pub lockout_period: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_failed_attempts: 5,
            lockout_period: Duration::minutes(15),
        }
    }
}

impl LockoutConfig {
    /// A configuration that never locks an account.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Lockout state of an account at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutStatus {
    pub username: String,
    pub failed_attempts: u32,
    pub is_locked: bool,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutStatus {
    /// Seconds until the lock lifts, if the account is locked.
    pub fn retry_after_seconds(&self) -> Option<i64> {
        self.retry_after_seconds_at(Utc::now())
    }

    pub fn retry_after_seconds_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.locked_until
            .filter(|_| self.is_locked)
            .map(|until| (until - now).num_seconds().max(0))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LockoutPolicy {
    config: LockoutConfig,
}

impl LockoutPolicy {
    pub fn new(config: LockoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Compute the lockout status of `account` as of `now`.
    ///
    /// A missing `last_attempt_at` counts as an attempt made at `now`.
    pub fn status(&self, account: &Account, now: DateTime<Utc>) -> LockoutStatus {
        let unlocked = LockoutStatus {
            username: account.username.clone(),
            failed_attempts: account.failed_attempts,
            is_locked: false,
            locked_until: None,
        };

        if !self.config.enabled || account.failed_attempts < self.config.max_failed_attempts {
            return unlocked;
        }

        let last_attempt = account.last_attempt_at.unwrap_or(now);
        if now - last_attempt >= self.config.lockout_period {
            return unlocked;
        }

        LockoutStatus {
            is_locked: true,
            locked_until: Some(last_attempt + self.config.lockout_period),
            ..unlocked
        }
    }

    pub fn is_locked(&self, account: &Account, now: DateTime<Utc>) -> bool {
        self.status(account, now).is_locked
    }
}
