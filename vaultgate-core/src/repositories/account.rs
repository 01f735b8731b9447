use crate::{Account, Error};
use async_trait::async_trait;

/// Repository for account data access
///
/// Implementations are responsible for serializing concurrent writes to the
/// same account, so that each failed password check increments the counter by
/// exactly one (e.g. per-account locking or compare-and-swap updates).
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Find an account by its username
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, Error>;

    /// Persist an updated account record
    async fn save(&self, account: &Account) -> Result<(), Error>;
}
