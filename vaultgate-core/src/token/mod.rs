//! Session token issuance
//!
//! This module defines the [`TokenIssuer`] trait the gate uses once a login has
//! fully succeeded, and an opaque, store-backed implementation.

pub mod opaque;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::Error;

pub use opaque::OpaqueTokenIssuer;

/// Trait for session token issuers
///
/// Tokens are opaque to the gate. Expiry is looked up separately, keyed by the
/// token that was just generated.
#[async_trait]
pub trait TokenIssuer: Send + Sync + 'static {
    /// Generate a new session token for `username`
    async fn generate(&self, username: &str) -> Result<String, Error>;

    /// Look up when a previously issued token expires
    async fn expiry(&self, token: &str) -> Result<DateTime<Utc>, Error>;
}

/// Configuration for issued tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// How long a token stays valid after issuance
    pub expires_in: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::minutes(30),
        }
    }
}

impl TokenConfig {
    /// Set the token lifetime
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expires_in = duration;
        self
    }
}
