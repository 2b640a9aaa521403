//! Port for production aggregation reads.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::stats::{AggregationWindow, Metric, ProductionTotals};

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductionStatsRepository: Send + Sync {
    /// Sum `metric` over a farm's records dated within `window`.
    async fn totals(
        &self,
        metric: Metric,
        farm_id: Uuid,
        window: AggregationWindow,
    ) -> Result<ProductionTotals, StoreError>;
}
