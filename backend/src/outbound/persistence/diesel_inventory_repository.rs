//! Feed completion: flag the inventory row and raise its restock alert in
//! one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{InventoryRepository, StoreError};
use crate::domain::{
    ChickenFeed, Farm, Feed, FeedCompletion, FeedKind, FinishedFeed, RestockAlertDraft, Scope,
    UserId,
};

use super::diesel_alert_repository::raise_alert;
use super::diesel_farm_store::DieselFarmStore;
use super::models::{ChickenFeedRow, FarmRow, FeedRow};
use super::schema::{chicken_feeds, farms, feeds};

async fn lock_feed(
    conn: &mut AsyncPgConnection,
    kind: FeedKind,
    feed_id: Uuid,
) -> Result<Option<FinishedFeed>, StoreError> {
    let feed = match kind {
        FeedKind::CowFeed => feeds::table
            .find(feed_id)
            .select(FeedRow::as_select())
            .for_update()
            .first(conn)
            .await
            .optional()?
            .map(Feed::try_from)
            .transpose()?
            .map(FinishedFeed::Cow),
        FeedKind::ChickenFeed => chicken_feeds::table
            .find(feed_id)
            .select(ChickenFeedRow::as_select())
            .for_update()
            .first(conn)
            .await
            .optional()?
            .map(ChickenFeed::try_from)
            .transpose()?
            .map(FinishedFeed::Chicken),
    };
    Ok(feed)
}

async fn store_depletion(
    conn: &mut AsyncPgConnection,
    feed: &FinishedFeed,
) -> Result<(), StoreError> {
    match feed {
        FinishedFeed::Cow(feed) => {
            diesel::update(feeds::table.find(feed.id))
                .set((
                    feeds::is_finished.eq(feed.is_finished),
                    feeds::needs_restock.eq(feed.needs_restock),
                ))
                .execute(conn)
                .await?;
        }
        FinishedFeed::Chicken(feed) => {
            diesel::update(chicken_feeds::table.find(feed.id))
                .set((
                    chicken_feeds::is_finished.eq(feed.is_finished),
                    chicken_feeds::needs_restock.eq(feed.needs_restock),
                ))
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl InventoryRepository for DieselFarmStore {
    async fn complete_feed(
        &self,
        kind: FeedKind,
        feed_id: Uuid,
        scope: &Scope,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<FeedCompletion>, StoreError> {
        let scope = *scope;
        let mut conn = self.conn().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let feed = lock_feed(conn, kind, feed_id).await?;
                let Some(mut feed) = feed.filter(|feed| scope.admits_farm(feed.farm_id())) else {
                    return Ok(None);
                };
                feed.mark_finished();
                store_depletion(conn, &feed).await?;

                let farm = farms::table
                    .find(feed.farm_id())
                    .select(FarmRow::as_select())
                    .first(conn)
                    .await?;
                let farm = Farm::try_from(farm)?;
                let draft = RestockAlertDraft::for_depleted_feed(
                    &farm,
                    kind.alert_type(),
                    feed.item_name(),
                    actor,
                );
                let (alert, alert_created) = raise_alert(conn, &draft, now).await?;
                info!(%feed_id, farm_id = %farm.id, alert_created, "feed marked finished");

                Ok(Some(FeedCompletion {
                    feed,
                    alert,
                    alert_created,
                }))
            }
            .scope_boxed()
        })
        .await
    }
}
