use async_trait::async_trait;
use dashmap::DashMap;

use crate::{Account, Error, error::StorageError, repositories::AccountRepository};

/// Account store backed by a concurrent map keyed by username.
///
/// `save` replaces the whole record with the caller's copy. The store does not
/// detect stale writes; concurrent read-modify-write cycles on one account are
/// serialized by the [`AuthorizationGate`](crate::AuthorizationGate).
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: DashMap<String, Account>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new account, failing if the username is taken
    pub fn insert(&self, account: Account) -> Result<(), Error> {
        use dashmap::mapref::entry::Entry;

        match self.accounts.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(StorageError::Constraint(format!(
                "username {} already exists",
                account.username
            ))
            .into()),
            Entry::Vacant(entry) => {
                entry.insert(account);
                Ok(())
            }
        }
    }

    /// Snapshot of the stored record for a username
    pub fn get(&self, username: &str) -> Option<Account> {
        self.accounts.get(username).map(|a| a.clone())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, Error> {
        Ok(self.get(username))
    }

    async fn save(&self, account: &Account) -> Result<(), Error> {
        match self.accounts.get_mut(&account.username) {
            Some(mut stored) => {
                *stored = account.clone();
                Ok(())
            }
            None => {
                tracing::error!(username = %account.username, "Attempted to save unknown account");
                Err(StorageError::NotFound.into())
            }
        }
    }
}
