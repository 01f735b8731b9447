//! Opaque token issuer
//!
//! Tokens are 256-bit random strings. Only their SHA256 hash is kept, so a dump
//! of the issuer's state cannot be replayed as live sessions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::{
    Error,
    crypto::{generate_secure_token, hash_token},
    error::TokenError,
};

use super::{TokenConfig, TokenIssuer};

#[derive(Debug, Clone)]
struct IssuedToken {
    username: String,
    expires_at: DateTime<Utc>,
}

/// Opaque token issuer
///
/// Keeps issued tokens in memory keyed by hash. Expired entries are removed by
/// [`cleanup_expired`](Self::cleanup_expired) or the background task started
/// with [`start_cleanup_task`](Self::start_cleanup_task).
#[derive(Debug, Clone, Default)]
pub struct OpaqueTokenIssuer {
    tokens: Arc<DashMap<String, IssuedToken>>,
    config: TokenConfig,
}

impl OpaqueTokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// The username a live token was issued to, if any
    pub fn username_for(&self, token: &str) -> Option<String> {
        let now = Utc::now();
        self.tokens
            .get(&hash_token(token))
            .filter(|issued| issued.expires_at > now)
            .map(|issued| issued.username.clone())
    }

    /// Revoke a token. Returns `true` if it was known.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(&hash_token(token)).is_some()
    }

    /// Drop every token that has expired. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.tokens.len();
        self.tokens.retain(|_, issued| issued.expires_at > now);
        before.saturating_sub(self.tokens.len())
    }

    /// Start the background cleanup task.
    ///
    /// Runs [`cleanup_expired`](Self::cleanup_expired) every `interval` until
    /// `shutdown` changes.
    pub fn start_cleanup_task(
        &self,
        interval: std::time::Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let issuer = self.clone();

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let count = issuer.cleanup_expired();
                        if count > 0 {
                            tracing::info!(count = count, "Cleaned up expired session tokens");
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down token cleanup task");
                        break;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl TokenIssuer for OpaqueTokenIssuer {
    async fn generate(&self, username: &str) -> Result<String, Error> {
        let token = generate_secure_token()?;
        let issued = IssuedToken {
            username: username.to_string(),
            expires_at: Utc::now() + self.config.expires_in,
        };
        self.tokens.insert(hash_token(&token), issued);
        Ok(token)
    }

    async fn expiry(&self, token: &str) -> Result<DateTime<Utc>, Error> {
        self.tokens
            .get(&hash_token(token))
            .map(|issued| issued.expires_at)
            .ok_or(Error::Token(TokenError::NotFound))
    }
}
