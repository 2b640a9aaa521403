//! Port for account persistence.
use async_trait::async_trait;

use crate::domain::accounts::{Account, PasswordDigest, UserId};
use crate::domain::scope::Scope;

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, StoreError>;

    /// Fetch an account with its password digest for login.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(Account, PasswordDigest)>, StoreError>;

    /// Accounts visible under `scope`.
    async fn list(&self, scope: &Scope) -> Result<Vec<Account>, StoreError>;

    /// Store a new account. Fails with [`StoreError::Conflict`] when the
    /// username is taken.
    async fn insert(&self, account: &Account, digest: &PasswordDigest) -> Result<(), StoreError>;

    /// Non-empty email addresses of every admin.
    async fn admin_contacts(&self) -> Result<Vec<String>, StoreError>;
}
