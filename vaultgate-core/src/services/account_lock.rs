//! Per-account serialization of login attempts.
//!
//! The gate reads an account, decides, and writes it back. Two attempts for
//! the same username running that sequence at once would both start from the
//! same counter value, so each attempt holds the account's lock from lookup to
//! the final write.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct AccountLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AccountLocks {
    /// Wait for exclusive access to `username`.
    pub(crate) async fn acquire(&self, username: &str) -> AccountGuard<'_> {
        let lock = self.locks.entry(username.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;

        AccountGuard {
            locks: &self.locks,
            username: username.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Held for the duration of one attempt. Dropping it releases the account and
/// forgets the lock once nobody else is waiting on it.
pub(crate) struct AccountGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    username: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.username, |_, lock| Arc::strong_count(lock) == 1);
    }
}
