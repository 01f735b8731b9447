//! Second-factor code validation
//!
//! The gate only asks a [`TwoFactorValidator`] whether a code is valid for a
//! username; how codes are generated, delivered and expired is owned by the
//! validator.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::{
    Error,
    crypto::{generate_numeric_code, hash_token, verify_token_hash},
};

#[async_trait]
pub trait TwoFactorValidator: Send + Sync + 'static {
    async fn validate(&self, username: &str, code: &str) -> Result<bool, Error>;
}

#[derive(Debug, Clone)]
struct PendingCode {
    code_hash: String,
    expires_at: DateTime<Utc>,
}

/// One-time numeric codes held in memory.
///
/// At most one code is pending per username; issuing a new code replaces the
/// previous one. A code is consumed by its first successful validation.
#[derive(Debug)]
pub struct InMemoryTwoFactorCodes {
    codes: DashMap<String, PendingCode>,
    ttl: Duration,
    digits: u32,
}

impl Default for InMemoryTwoFactorCodes {
    fn default() -> Self {
        Self::new(Duration::minutes(5))
    }
}

impl InMemoryTwoFactorCodes {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: DashMap::new(),
            ttl,
            digits: 6,
        }
    }

    /// Issue a fresh code for `username`. The caller delivers it out of band.
    pub fn issue(&self, username: &str) -> Result<String, Error> {
        let code = generate_numeric_code(self.digits)?;
        self.codes.insert(
            username.to_string(),
            PendingCode {
                code_hash: hash_token(&code),
                expires_at: Utc::now() + self.ttl,
            },
        );
        tracing::debug!(username = %username, "Issued two-factor code");
        Ok(code)
    }

    pub fn has_pending(&self, username: &str) -> bool {
        self.codes.contains_key(username)
    }
}

#[async_trait]
impl TwoFactorValidator for InMemoryTwoFactorCodes {
    async fn validate(&self, username: &str, code: &str) -> Result<bool, Error> {
        let now = Utc::now();
        let consumed = self.codes.remove_if(username, |_, pending| {
            pending.expires_at > now && verify_token_hash(code, &pending.code_hash)
        });
        Ok(consumed.is_some())
    }
}
