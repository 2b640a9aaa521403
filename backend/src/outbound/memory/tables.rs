//! Table layout and row rules for the in-memory store.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::StoreError;
use crate::domain::{
    Account, Animal, CalfSummary, ChickenBatch, ChickenFeed, EggProduction, Farm, Feed,
    FeedConsumption, HealthRecord, MilkProduction, MilkSale, Ownership, PasswordDigest, Record,
    RestockAlert, RestockAlertDraft, Scope,
};

#[derive(Default)]
pub struct Tables {
    pub(super) farms: Vec<Farm>,
    pub(super) animals: Vec<Animal>,
    pub(super) chicken_batches: Vec<ChickenBatch>,
    pub(super) milk_production: Vec<MilkProduction>,
    pub(super) milk_sales: Vec<MilkSale>,
    pub(super) feeds: Vec<Feed>,
    pub(super) chicken_feeds: Vec<ChickenFeed>,
    pub(super) feed_consumption: Vec<FeedConsumption>,
    pub(super) health_records: Vec<HealthRecord>,
    pub(super) egg_production: Vec<EggProduction>,
    pub(super) alerts: Vec<RestockAlert>,
    pub(super) accounts: Vec<(Account, PasswordDigest)>,
}

impl Tables {
    pub fn animal_farm(&self, animal_id: Uuid) -> Option<Uuid> {
        self.animals
            .iter()
            .find(|animal| animal.id == animal_id)
            .map(|animal| animal.farm_id)
    }

    pub fn batch_farm(&self, batch_id: Uuid) -> Option<Uuid> {
        self.chicken_batches
            .iter()
            .find(|batch| batch.id == batch_id)
            .map(|batch| batch.farm_id)
    }

    /// Farm that ultimately owns `record`.
    fn owning_farm<R: Table>(&self, record: &R) -> Option<Uuid> {
        match R::OWNERSHIP {
            Ownership::Farm => Some(record.owner_id()),
            Ownership::Animal => self.animal_farm(record.owner_id()),
            Ownership::Batch => self.batch_farm(record.owner_id()),
        }
    }

    pub fn visible<R: Table>(&self, record: &R, scope: &Scope) -> bool {
        self.owning_farm(record)
            .is_some_and(|farm_id| scope.admits_farm(farm_id))
    }

    fn calves_of(&self, mother_id: Uuid) -> Vec<CalfSummary> {
        self.animals
            .iter()
            .filter(|animal| animal.mother_id == Some(mother_id))
            .map(|animal| CalfSummary {
                id: animal.id,
                name: animal.name.clone(),
            })
            .collect()
    }

    fn remove_farm(&mut self, farm_id: Uuid) {
        let animals: Vec<Uuid> = self
            .animals
            .iter()
            .filter(|animal| animal.farm_id == farm_id)
            .map(|animal| animal.id)
            .collect();
        for animal_id in animals {
            self.remove_animal(animal_id);
        }
        let batches: Vec<Uuid> = self
            .chicken_batches
            .iter()
            .filter(|batch| batch.farm_id == farm_id)
            .map(|batch| batch.id)
            .collect();
        for batch_id in batches {
            self.remove_batch(batch_id);
        }
        let feeds: Vec<Uuid> = self
            .feeds
            .iter()
            .filter(|feed| feed.farm_id == farm_id)
            .map(|feed| feed.id)
            .collect();
        for feed_id in feeds {
            self.remove_feed(feed_id);
        }
        self.milk_sales.retain(|sale| sale.farm_id != farm_id);
        self.chicken_feeds.retain(|feed| feed.farm_id != farm_id);
        self.alerts.retain(|alert| alert.farm_id != farm_id);
        for (account, _) in &mut self.accounts {
            if account.assigned_farm == Some(farm_id) {
                account.assigned_farm = None;
            }
        }
        self.farms.retain(|farm| farm.id != farm_id);
    }

    fn remove_animal(&mut self, animal_id: Uuid) {
        self.milk_production.retain(|record| record.cow_id != animal_id);
        self.feed_consumption.retain(|record| record.cow_id != animal_id);
        self.health_records.retain(|record| record.cow_id != animal_id);
        for calf in &mut self.animals {
            if calf.mother_id == Some(animal_id) {
                calf.mother_id = None;
            }
        }
        self.animals.retain(|animal| animal.id != animal_id);
    }

    fn remove_batch(&mut self, batch_id: Uuid) {
        self.egg_production.retain(|record| record.batch_id != batch_id);
        self.chicken_batches.retain(|batch| batch.id != batch_id);
    }

    fn remove_feed(&mut self, feed_id: Uuid) {
        self.feed_consumption.retain(|record| record.feed_id != feed_id);
        self.feeds.retain(|feed| feed.id != feed_id);
    }

    /// Insert an alert unless one is still open for the same farm and item.
    pub fn raise_alert(
        &mut self,
        draft: &RestockAlertDraft,
        now: DateTime<Utc>,
    ) -> (RestockAlert, bool) {
        let open = self.alerts.iter().find(|alert| {
            !alert.is_resolved
                && alert.farm_id == draft.farm_id
                && alert.item_name == draft.item_name
        });
        if let Some(open) = open {
            return (open.clone(), false);
        }
        let alert = draft.clone().into_alert(Uuid::new_v4(), now);
        self.alerts.push(alert.clone());
        (alert, true)
    }
}

/// Where a record kind lives and which rows it may not coexist with.
pub trait Table: Record {
    fn rows(tables: &Tables) -> &Vec<Self>;

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self>;

    /// Conflict message when `self` breaks a uniqueness rule against `other`.
    fn clashes_with(&self, _other: &Self) -> Option<&'static str> {
        None
    }

    /// Apply a full replacement to the stored row.
    fn overwrite(&mut self, record: &Self) {
        *self = record.clone();
    }

    /// Stored row as returned to callers.
    fn read(&self, _tables: &Tables) -> Self {
        self.clone()
    }

    /// Delete the row and everything hanging off it.
    fn remove(tables: &mut Tables, id: Uuid) {
        Self::rows_mut(tables).retain(|row| row.id() != id);
    }
}

macro_rules! plain_table {
    ($record:ty => $field:ident) => {
        impl Table for $record {
            fn rows(tables: &Tables) -> &Vec<Self> {
                &tables.$field
            }

            fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
                &mut tables.$field
            }
        }
    };
}

plain_table!(MilkSale => milk_sales);
plain_table!(ChickenFeed => chicken_feeds);
plain_table!(FeedConsumption => feed_consumption);
plain_table!(HealthRecord => health_records);
plain_table!(EggProduction => egg_production);

impl Table for Farm {
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.farms
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.farms
    }

    fn remove(tables: &mut Tables, id: Uuid) {
        tables.remove_farm(id);
    }
}

impl Table for Animal {
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.animals
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.animals
    }

    fn read(&self, tables: &Tables) -> Self {
        Self {
            calves: tables.calves_of(self.id),
            ..self.clone()
        }
    }

    fn remove(tables: &mut Tables, id: Uuid) {
        tables.remove_animal(id);
    }
}

impl Table for ChickenBatch {
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.chicken_batches
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.chicken_batches
    }

    fn clashes_with(&self, other: &Self) -> Option<&'static str> {
        (self.farm_id == other.farm_id && self.batch_number == other.batch_number)
            .then_some("batch number already used on this farm")
    }

    /// The live count only moves through mortality and hatching updates.
    fn overwrite(&mut self, record: &Self) {
        *self = Self {
            current_count: self.current_count,
            ..record.clone()
        };
    }

    fn remove(tables: &mut Tables, id: Uuid) {
        tables.remove_batch(id);
    }
}

impl Table for MilkProduction {
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.milk_production
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.milk_production
    }

    fn clashes_with(&self, other: &Self) -> Option<&'static str> {
        (self.cow_id == other.cow_id && self.date == other.date && self.session == other.session)
            .then_some("milk already recorded for this cow, date and session")
    }
}

impl Table for Feed {
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.feeds
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.feeds
    }

    fn remove(tables: &mut Tables, id: Uuid) {
        tables.remove_feed(id);
    }
}

pub fn check_unique<R: Table>(tables: &Tables, record: &R) -> Result<(), StoreError> {
    match R::rows(tables)
        .iter()
        .filter(|row| row.id() != record.id())
        .find_map(|row| record.clashes_with(row))
    {
        Some(message) => Err(StoreError::conflict(message)),
        None => Ok(()),
    }
}
