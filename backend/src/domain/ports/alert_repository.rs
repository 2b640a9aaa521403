//! Port for restock alert persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::alerts::{RestockAlert, RestockAlertDraft};
use crate::domain::scope::Scope;

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Alerts visible under `scope`, newest first.
    async fn list(&self, scope: &Scope) -> Result<Vec<RestockAlert>, StoreError>;

    /// The alert with `id`, if visible under `scope`.
    async fn find(&self, id: Uuid, scope: &Scope) -> Result<Option<RestockAlert>, StoreError>;

    /// Insert an alert unless an unresolved one exists for the same farm and
    /// item. Returns the open alert and whether it was created.
    ///
    /// Feed completion applies the same rule inside
    /// [`InventoryRepository::complete_feed`](super::InventoryRepository::complete_feed).
    async fn raise(
        &self,
        draft: &RestockAlertDraft,
        now: DateTime<Utc>,
    ) -> Result<(RestockAlert, bool), StoreError>;

    /// Mark an alert resolved. Returns `None` for unknown ids.
    async fn resolve(&self, id: Uuid) -> Result<Option<RestockAlert>, StoreError>;
}
