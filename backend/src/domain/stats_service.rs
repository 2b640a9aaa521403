//! Production statistics over farm-scoped windows.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::farm::Farm;
use crate::domain::ports::{ProductionStatsRepository, RecordRepository};
use crate::domain::scope::{ResourceKind, Scope, resolve_scope};
use crate::domain::stats::{AggregationWindow, Metric, Period, ProductionTotals};
use crate::domain::{Error, Principal};

#[derive(Clone)]
pub struct StatsService {
    farms: Arc<dyn RecordRepository<Farm>>,
    stats: Arc<dyn ProductionStatsRepository>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl StatsService {
    /// `offset` fixes the calendar used for "today".
    pub fn new(
        farms: Arc<dyn RecordRepository<Farm>>,
        stats: Arc<dyn ProductionStatsRepository>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            farms,
            stats,
            clock,
            offset,
        }
    }

    /// Current date in the configured offset.
    pub fn today(&self) -> NaiveDate {
        self.clock.utc().with_timezone(&self.offset).date_naive()
    }

    /// Total and record count of `metric` for a visible farm over the
    /// `period` window ending at `as_of` (default today).
    pub async fn aggregate(
        &self,
        principal: &Principal,
        metric: Metric,
        farm_id: Uuid,
        period: Period,
        as_of: Option<NaiveDate>,
    ) -> Result<ProductionTotals, Error> {
        let not_found = || Error::not_found(format!("farm {farm_id} not found"));
        let scope = resolve_scope(principal, ResourceKind::Farm);
        if scope == Scope::Nothing {
            return Err(not_found());
        }
        self.farms
            .find(farm_id, &scope)
            .await?
            .ok_or_else(not_found)?;

        let window = AggregationWindow::ending(period, as_of.unwrap_or_else(|| self.today()))?;
        let totals = self.stats.totals(metric, farm_id, window).await?;
        debug!(%farm_id, ?metric, ?period, start = %window.start, end = %window.end, count = totals.count, "production aggregated");
        Ok(totals)
    }
}
