//! Port for the feed depletion workflow.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::accounts::UserId;
use crate::domain::feed::{FeedCompletion, FeedKind};
use crate::domain::scope::Scope;

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Mark a feed finished and raise its restock alert in one transaction.
    ///
    /// The alert is only inserted when no unresolved alert exists for the
    /// same farm and item. Returns `None` when the feed is absent, of another
    /// kind, or outside `scope`.
    async fn complete_feed(
        &self,
        kind: FeedKind,
        feed_id: Uuid,
        scope: &Scope,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<FeedCompletion>, StoreError>;
}
