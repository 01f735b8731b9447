//! Audit trail for authorization attempts
//!
//! The gate reports every terminal outcome to an [`AuditLogger`]. Two shapes
//! exist: a plain attempt (success flag plus optional note) and a failed
//! attempt with a reason tag. Loggers must have recorded, or durably queued,
//! the event by the time their future completes.
//!
//! Bundled loggers:
//!
//! - [`TracingAuditLogger`] writes events to `tracing` under the
//!   `vaultgate::audit` target.
//! - [`MemoryAuditLog`] keeps events in memory, mostly for tests.
//! - [`AuditFanout`] forwards every event to a list of loggers in order.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Error;

/// Username recorded when a submission carries none.
pub const UNKNOWN_USERNAME: &str = "UNKNOWN";

/// Reason tags attached to failed-attempt events.
pub mod tags {
    pub const INVALID_INPUT: &str = "invalid username or password";
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const ACCOUNT_INACTIVE: &str = "User account is inactive";
    pub const ACCOUNT_LOCKED: &str = "Account locked due to failed attempts";
    pub const INVALID_PASSWORD: &str = "Invalid password";
    pub const AWAITING_SECOND_FACTOR: &str = "Awaiting 2FA code";
    pub const INVALID_SECOND_FACTOR: &str = "Invalid 2FA code";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventKind {
    /// A login attempt that reached a decision, successful or not
    Attempt,
    /// A login attempt rejected for a tagged reason
    FailedAttempt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub username: String,
    pub success: bool,
    pub reason: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditLogger: Send + Sync + 'static {
    async fn record_attempt(
        &self,
        username: &str,
        success: bool,
        reason: Option<&str>,
    ) -> Result<(), Error>;

    async fn record_failed_attempt(&self, username: &str, reason: &str) -> Result<(), Error>;
}

/// Writes audit events as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn record_attempt(
        &self,
        username: &str,
        success: bool,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        tracing::info!(
            target: "vaultgate::audit",
            username = %username,
            success = success,
            reason = reason.unwrap_or_default(),
            "Login attempt"
        );
        Ok(())
    }

    async fn record_failed_attempt(&self, username: &str, reason: &str) -> Result<(), Error> {
        tracing::warn!(
            target: "vaultgate::audit",
            username = %username,
            reason = reason,
            "Failed login attempt"
        );
        Ok(())
    }
}

/// In-memory audit sink.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    pub fn events_for(&self, username: &str) -> Vec<AuditEvent> {
        self.lock()
            .iter()
            .filter(|e| e.username == username)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<AuditEvent> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, kind: AuditEventKind, username: &str, success: bool, reason: Option<&str>) {
        self.lock().push(AuditEvent {
            kind,
            username: username.to_string(),
            success,
            reason: reason.map(str::to_string),
            recorded_at: Utc::now(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEvent>> {
        // A poisoned log still holds every event recorded before the panic.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AuditLogger for MemoryAuditLog {
    async fn record_attempt(
        &self,
        username: &str,
        success: bool,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        self.push(AuditEventKind::Attempt, username, success, reason);
        Ok(())
    }

    async fn record_failed_attempt(&self, username: &str, reason: &str) -> Result<(), Error> {
        self.push(AuditEventKind::FailedAttempt, username, false, Some(reason));
        Ok(())
    }
}

/// Forwards each event to every registered logger.
///
/// The first logger error stops delivery and is returned to the caller.
#[derive(Clone, Default)]
pub struct AuditFanout {
    loggers: Arc<RwLock<Vec<Arc<dyn AuditLogger>>>>,
}

impl AuditFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, logger: Arc<dyn AuditLogger>) {
        self.loggers.write().await.push(logger);
    }
}

#[async_trait]
impl AuditLogger for AuditFanout {
    async fn record_attempt(
        &self,
        username: &str,
        success: bool,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        for logger in self.loggers.read().await.iter() {
            logger.record_attempt(username, success, reason).await?;
        }
        Ok(())
    }

    async fn record_failed_attempt(&self, username: &str, reason: &str) -> Result<(), Error> {
        for logger in self.loggers.read().await.iter() {
            logger.record_failed_attempt(username, reason).await?;
        }
        Ok(())
    }
}
