//! In-memory entity store.
//!
//! Backs the whole application when no database URL is configured and
//! drives the HTTP integration tests. Every port method takes the single
//! table lock once, so each call is atomic the way a database transaction
//! would be. Cascades, `SET NULL` references and uniqueness rules mirror the
//! PostgreSQL schema.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::{
    AccountRepository, AlertRepository, BatchCountRepository, InventoryRepository,
    ProductionStatsRepository, RecordRepository, ReferenceLookup, StoreError,
};
use crate::domain::{
    Account, AggregationWindow, ChickenBatch, CountAdjustment, FeedCompletion, FeedKind,
    FinishedFeed, Metric, PasswordDigest, ProductionTotals, Reference, RestockAlert,
    RestockAlertDraft, Role, Scope, UserId,
};

mod tables;

use self::tables::{Table, Tables, check_unique};

/// Entity store holding every table behind one mutex.
///
/// # Examples
/// ```
/// use herdbook::outbound::memory::InMemoryFarmStore;
///
/// let store = InMemoryFarmStore::default();
/// # let _ = store;
/// ```
#[derive(Default)]
pub struct InMemoryFarmStore {
    tables: Mutex<Tables>,
}

impl InMemoryFarmStore {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::query("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl<R: Table> RecordRepository<R> for InMemoryFarmStore {
    async fn list(&self, scope: &Scope) -> Result<Vec<R>, StoreError> {
        let tables = self.tables()?;
        Ok(R::rows(&tables)
            .iter()
            .filter(|row| tables.visible(*row, scope))
            .map(|row| row.read(&tables))
            .collect())
    }

    async fn find(&self, id: Uuid, scope: &Scope) -> Result<Option<R>, StoreError> {
        let tables = self.tables()?;
        Ok(R::rows(&tables)
            .iter()
            .find(|row| row.id() == id && tables.visible(*row, scope))
            .map(|row| row.read(&tables)))
    }

    async fn insert(&self, record: &R) -> Result<R, StoreError> {
        let mut tables = self.tables()?;
        check_unique(&tables, record)?;
        R::rows_mut(&mut tables).push(record.clone());
        Ok(record.read(&tables))
    }

    async fn update(&self, record: &R) -> Result<R, StoreError> {
        let mut tables = self.tables()?;
        check_unique(&tables, record)?;
        let slot = R::rows_mut(&mut tables)
            .iter_mut()
            .find(|row| row.id() == record.id())
            .ok_or_else(|| {
                StoreError::query(format!("{} {} does not exist", R::KIND.label(), record.id()))
            })?;
        slot.overwrite(record);
        let stored = slot.clone();
        Ok(stored.read(&tables))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        if !R::rows(&tables).iter().any(|row| row.id() == id) {
            return Ok(false);
        }
        R::remove(&mut tables, id);
        Ok(true)
    }
}

#[async_trait]
impl ReferenceLookup for InMemoryFarmStore {
    async fn farm_of(&self, reference: Reference) -> Result<Option<Uuid>, StoreError> {
        let tables = self.tables()?;
        Ok(match reference {
            Reference::Farm(id) => tables.farms.iter().any(|farm| farm.id == id).then_some(id),
            Reference::Animal(id) | Reference::Mother(id) => tables.animal_farm(id),
            Reference::Batch(id) => tables.batch_farm(id),
            Reference::Feed(id) => tables
                .feeds
                .iter()
                .find(|feed| feed.id == id)
                .map(|feed| feed.farm_id),
        })
    }

    async fn mother_of(&self, animal_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .animals
            .iter()
            .find(|animal| animal.id == animal_id)
            .and_then(|animal| animal.mother_id))
    }
}

#[async_trait]
impl AccountRepository for InMemoryFarmStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .accounts
            .iter()
            .find(|(account, _)| account.id == id)
            .map(|(account, _)| account.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(Account, PasswordDigest)>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .accounts
            .iter()
            .find(|(account, _)| account.username == username)
            .cloned())
    }

    async fn list(&self, scope: &Scope) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .accounts
            .iter()
            .map(|(account, _)| account)
            .filter(|account| match scope {
                Scope::All => true,
                Scope::Account(id) => account.id == *id,
                Scope::Farm(farm_id) => account.assigned_farm == Some(*farm_id),
                Scope::Nothing => false,
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, account: &Account, digest: &PasswordDigest) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables
            .accounts
            .iter()
            .any(|(existing, _)| existing.username == account.username)
        {
            return Err(StoreError::conflict(format!(
                "username `{}` is already taken",
                account.username
            )));
        }
        tables.accounts.push((account.clone(), digest.clone()));
        Ok(())
    }

    async fn admin_contacts(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .accounts
            .iter()
            .map(|(account, _)| account)
            .filter(|account| account.role == Role::Admin && !account.email.trim().is_empty())
            .map(|account| account.email.clone())
            .collect())
    }
}

#[async_trait]
impl BatchCountRepository for InMemoryFarmStore {
    async fn adjust_count(
        &self,
        batch_id: Uuid,
        scope: &Scope,
        adjustment: CountAdjustment,
    ) -> Result<Option<ChickenBatch>, StoreError> {
        let mut tables = self.tables()?;
        let Some(batch) = tables
            .chicken_batches
            .iter_mut()
            .find(|batch| batch.id == batch_id && scope.admits_farm(batch.farm_id))
        else {
            return Ok(None);
        };
        batch.current_count = adjustment
            .apply(batch.current_count)
            .map_err(StoreError::rejected)?;
        Ok(Some(batch.clone()))
    }
}

#[async_trait]
impl InventoryRepository for InMemoryFarmStore {
    async fn complete_feed(
        &self,
        kind: FeedKind,
        feed_id: Uuid,
        scope: &Scope,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<FeedCompletion>, StoreError> {
        let mut tables = self.tables()?;
        let feed = match kind {
            FeedKind::CowFeed => tables
                .feeds
                .iter_mut()
                .find(|feed| feed.id == feed_id && scope.admits_farm(feed.farm_id))
                .map(|feed| {
                    feed.is_finished = true;
                    feed.needs_restock = true;
                    FinishedFeed::Cow(feed.clone())
                }),
            FeedKind::ChickenFeed => tables
                .chicken_feeds
                .iter_mut()
                .find(|feed| feed.id == feed_id && scope.admits_farm(feed.farm_id))
                .map(|feed| {
                    feed.is_finished = true;
                    feed.needs_restock = true;
                    FinishedFeed::Chicken(feed.clone())
                }),
        };
        let Some(feed) = feed else {
            return Ok(None);
        };
        let farm = tables
            .farms
            .iter()
            .find(|farm| farm.id == feed.farm_id())
            .cloned()
            .ok_or_else(|| StoreError::query(format!("farm {} missing", feed.farm_id())))?;
        let draft =
            RestockAlertDraft::for_depleted_feed(&farm, kind.alert_type(), feed.item_name(), actor);
        let (alert, alert_created) = tables.raise_alert(&draft, now);
        Ok(Some(FeedCompletion {
            feed,
            alert,
            alert_created,
        }))
    }
}

#[async_trait]
impl AlertRepository for InMemoryFarmStore {
    async fn list(&self, scope: &Scope) -> Result<Vec<RestockAlert>, StoreError> {
        let tables = self.tables()?;
        let mut alerts: Vec<RestockAlert> = tables
            .alerts
            .iter()
            .filter(|alert| scope.admits_farm(alert.farm_id))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    async fn find(&self, id: Uuid, scope: &Scope) -> Result<Option<RestockAlert>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .alerts
            .iter()
            .find(|alert| alert.id == id && scope.admits_farm(alert.farm_id))
            .cloned())
    }

    async fn raise(
        &self,
        draft: &RestockAlertDraft,
        now: DateTime<Utc>,
    ) -> Result<(RestockAlert, bool), StoreError> {
        let mut tables = self.tables()?;
        Ok(tables.raise_alert(draft, now))
    }

    async fn resolve(&self, id: Uuid) -> Result<Option<RestockAlert>, StoreError> {
        let mut tables = self.tables()?;
        Ok(tables
            .alerts
            .iter_mut()
            .find(|alert| alert.id == id)
            .map(|alert| {
                alert.is_resolved = true;
                alert.clone()
            }))
    }
}

#[async_trait]
impl ProductionStatsRepository for InMemoryFarmStore {
    async fn totals(
        &self,
        metric: Metric,
        farm_id: Uuid,
        window: AggregationWindow,
    ) -> Result<ProductionTotals, StoreError> {
        let tables = self.tables()?;
        let totals = match metric {
            Metric::Milk => tables
                .milk_production
                .iter()
                .filter(|record| {
                    window.contains(record.date) && tables.animal_farm(record.cow_id) == Some(farm_id)
                })
                .fold(ProductionTotals::default(), |totals, record| {
                    totals.add(record.quantity)
                }),
            Metric::Eggs => tables
                .egg_production
                .iter()
                .filter(|record| {
                    window.contains(record.date)
                        && tables.batch_farm(record.batch_id) == Some(farm_id)
                })
                .fold(ProductionTotals::default(), |totals, record| {
                    totals.add(Decimal::from(record.eggs_collected))
                }),
        };
        Ok(totals)
    }
}

#[cfg(test)]
mod tests;
