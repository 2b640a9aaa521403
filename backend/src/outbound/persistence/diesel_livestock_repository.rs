//! Batch head-count changes under a row lock.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BatchCountRepository, StoreError};
use crate::domain::{ChickenBatch, CountAdjustment, Scope};

use super::diesel_farm_store::DieselFarmStore;
use super::diesel_helpers::{count_from_db, count_to_db};
use super::models::ChickenBatchRow;
use super::schema::chicken_batches;

#[async_trait]
impl BatchCountRepository for DieselFarmStore {
    async fn adjust_count(
        &self,
        batch_id: Uuid,
        scope: &Scope,
        adjustment: CountAdjustment,
    ) -> Result<Option<ChickenBatch>, StoreError> {
        let scope = *scope;
        let mut conn = self.conn().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let row = chicken_batches::table
                    .find(batch_id)
                    .select(ChickenBatchRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(mut row) = row.filter(|row| scope.admits_farm(row.farm_id)) else {
                    return Ok(None);
                };

                let current = count_from_db("current_count", row.current_count)?;
                let next = adjustment.apply(current).map_err(StoreError::rejected)?;
                row.current_count = count_to_db("current_count", next)?;
                diesel::update(chicken_batches::table.find(batch_id))
                    .set(chicken_batches::current_count.eq(row.current_count))
                    .execute(conn)
                    .await?;
                debug!(%batch_id, from = current, to = next, "batch count adjusted");

                ChickenBatch::try_from(row).map(Some)
            }
            .scope_boxed()
        })
        .await
    }
}
