//! Port for atomic batch head-count changes.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::livestock::{ChickenBatch, CountAdjustment};
use crate::domain::scope::Scope;

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchCountRepository: Send + Sync {
    /// Apply `adjustment` to the batch under a row lock.
    ///
    /// Returns `None` when the batch is absent or outside `scope`. An
    /// adjustment that cannot be applied fails with [`StoreError::Rejected`]
    /// and leaves the count untouched.
    async fn adjust_count(
        &self,
        batch_id: Uuid,
        scope: &Scope,
        adjustment: CountAdjustment,
    ) -> Result<Option<ChickenBatch>, StoreError>;
}
