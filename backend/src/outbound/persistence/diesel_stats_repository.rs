//! Production sums computed in SQL.

use async_trait::async_trait;
use diesel::dsl::{count, sum};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::{ProductionStatsRepository, StoreError};
use crate::domain::{AggregationWindow, Metric, ProductionTotals};

use super::diesel_farm_store::DieselFarmStore;
use super::schema::{animals, chicken_batches, egg_production, milk_production};

fn record_count(raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::query(format!("negative record count {raw}")))
}

#[async_trait]
impl ProductionStatsRepository for DieselFarmStore {
    async fn totals(
        &self,
        metric: Metric,
        farm_id: Uuid,
        window: AggregationWindow,
    ) -> Result<ProductionTotals, StoreError> {
        let mut conn = self.conn().await?;
        let (total, records) = match metric {
            Metric::Milk => {
                let (total, records): (Option<Decimal>, i64) = milk_production::table
                    .inner_join(animals::table)
                    .filter(animals::farm_id.eq(farm_id))
                    .filter(milk_production::date.between(window.start, window.end))
                    .select((sum(milk_production::quantity), count(milk_production::id)))
                    .first(&mut conn)
                    .await?;
                (total.unwrap_or_default(), records)
            }
            Metric::Eggs => {
                let (total, records): (Option<i64>, i64) = egg_production::table
                    .inner_join(chicken_batches::table)
                    .filter(chicken_batches::farm_id.eq(farm_id))
                    .filter(egg_production::date.between(window.start, window.end))
                    .select((sum(egg_production::eggs_collected), count(egg_production::id)))
                    .first(&mut conn)
                    .await?;
                (Decimal::from(total.unwrap_or_default()), records)
            }
        };
        Ok(ProductionTotals {
            total,
            count: record_count(records)?,
        })
    }
}
