//! Internal Diesel row structs and their domain conversions.
//!
//! Rows never leave the persistence layer. Enums are stored as their
//! snake_case labels and counts as `INTEGER`, so both directions of every
//! conversion are fallible.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::StoreError;
use crate::domain::{
    Account, AlertType, Animal, ChickenBatch, ChickenFeed, EggProduction, Farm, Feed,
    FeedConsumption, FeedType, HealthRecord, LifecycleStage, MilkProduction, MilkSale,
    MilkSession, PasswordDigest, RestockAlert, RestockAlertDraft, Role, UserId,
};

use super::diesel_helpers::{count_from_db, count_to_db, decode_label};
use super::schema::{
    accounts, animals, chicken_batches, chicken_feeds, egg_production, farms, feed_consumption,
    feeds, health_records, milk_production, milk_sales, restock_alerts,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = farms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FarmRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FarmRow> for Farm {
    type Error = StoreError;

    fn try_from(row: FarmRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            location: row.location,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&Farm> for FarmRow {
    type Error = StoreError;

    fn try_from(farm: &Farm) -> Result<Self, Self::Error> {
        Ok(Self {
            id: farm.id,
            name: farm.name.clone(),
            location: farm.location.clone(),
            created_at: farm.created_at,
        })
    }
}

/// Account row including the password digest.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub assigned_farm: Option<Uuid>,
    pub phone: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    pub(crate) fn new(account: &Account, digest: &PasswordDigest) -> Self {
        Self {
            id: *account.id.as_uuid(),
            username: account.username.clone(),
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            role: account.role.as_str().to_owned(),
            assigned_farm: account.assigned_farm,
            phone: account.phone.clone(),
            password_digest: digest.as_str().to_owned(),
            created_at: account.created_at,
        }
    }

    /// Split the row into the account and its digest.
    pub(crate) fn into_parts(self) -> Result<(Account, PasswordDigest), StoreError> {
        let role = decode_label("role", &self.role, Role::parse)?;
        let account = Account {
            id: UserId::from_uuid(self.id),
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            assigned_farm: self.assigned_farm,
            phone: self.phone,
            created_at: self.created_at,
        };
        Ok((account, PasswordDigest::from_stored(self.password_digest)))
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = animals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AnimalRow {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub stage: String,
    pub mother_id: Option<Uuid>,
    pub birth_date: NaiveDate,
    pub ai_date: Option<NaiveDate>,
    pub estimated_birth: Option<NaiveDate>,
    pub actual_birth: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AnimalRow> for Animal {
    type Error = StoreError;

    fn try_from(row: AnimalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            farm_id: row.farm_id,
            name: row.name,
            stage: decode_label("stage", &row.stage, LifecycleStage::parse)?,
            mother_id: row.mother_id,
            birth_date: row.birth_date,
            ai_date: row.ai_date,
            estimated_birth: row.estimated_birth,
            actual_birth: row.actual_birth,
            notes: row.notes,
            created_at: row.created_at,
            calves: Vec::new(),
        })
    }
}

impl TryFrom<&Animal> for AnimalRow {
    type Error = StoreError;

    fn try_from(animal: &Animal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: animal.id,
            farm_id: animal.farm_id,
            name: animal.name.clone(),
            stage: animal.stage.as_str().to_owned(),
            mother_id: animal.mother_id,
            birth_date: animal.birth_date,
            ai_date: animal.ai_date,
            estimated_birth: animal.estimated_birth,
            actual_birth: animal.actual_birth,
            notes: animal.notes.clone(),
            created_at: animal.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = chicken_batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChickenBatchRow {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub batch_name: String,
    pub batch_number: i32,
    pub initial_count: i32,
    pub current_count: i32,
    pub purchase_date: NaiveDate,
    pub hatch_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ChickenBatchRow> for ChickenBatch {
    type Error = StoreError;

    fn try_from(row: ChickenBatchRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            farm_id: row.farm_id,
            batch_name: row.batch_name,
            batch_number: count_from_db("batch_number", row.batch_number)?,
            initial_count: count_from_db("initial_count", row.initial_count)?,
            current_count: count_from_db("current_count", row.current_count)?,
            purchase_date: row.purchase_date,
            hatch_date: row.hatch_date,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&ChickenBatch> for ChickenBatchRow {
    type Error = StoreError;

    fn try_from(batch: &ChickenBatch) -> Result<Self, Self::Error> {
        Ok(Self {
            id: batch.id,
            farm_id: batch.farm_id,
            batch_name: batch.batch_name.clone(),
            batch_number: count_to_db("batch_number", batch.batch_number)?,
            initial_count: count_to_db("initial_count", batch.initial_count)?,
            current_count: count_to_db("current_count", batch.current_count)?,
            purchase_date: batch.purchase_date,
            hatch_date: batch.hatch_date,
            created_at: batch.created_at,
        })
    }
}

/// Columns a batch replace may write. `current_count` only moves through
/// head count adjustments.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = chicken_batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ChickenBatchChanges {
    pub farm_id: Uuid,
    pub batch_name: String,
    pub batch_number: i32,
    pub initial_count: i32,
    pub purchase_date: NaiveDate,
    pub hatch_date: Option<NaiveDate>,
}

impl TryFrom<&ChickenBatch> for ChickenBatchChanges {
    type Error = StoreError;

    fn try_from(batch: &ChickenBatch) -> Result<Self, Self::Error> {
        Ok(Self {
            farm_id: batch.farm_id,
            batch_name: batch.batch_name.clone(),
            batch_number: count_to_db("batch_number", batch.batch_number)?,
            initial_count: count_to_db("initial_count", batch.initial_count)?,
            purchase_date: batch.purchase_date,
            hatch_date: batch.hatch_date,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = milk_production)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MilkProductionRow {
    pub id: Uuid,
    pub cow_id: Uuid,
    pub date: NaiveDate,
    pub session: String,
    pub quantity: Decimal,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MilkProductionRow> for MilkProduction {
    type Error = StoreError;

    fn try_from(row: MilkProductionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            cow_id: row.cow_id,
            date: row.date,
            session: decode_label("session", &row.session, MilkSession::parse)?,
            quantity: row.quantity,
            recorded_by: UserId::from_uuid(row.recorded_by),
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&MilkProduction> for MilkProductionRow {
    type Error = StoreError;

    fn try_from(record: &MilkProduction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            cow_id: record.cow_id,
            date: record.date,
            session: record.session.as_str().to_owned(),
            quantity: record.quantity,
            recorded_by: *record.recorded_by.as_uuid(),
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = milk_sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MilkSaleRow {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub date: NaiveDate,
    pub quantity_sold: Decimal,
    pub price_per_liter: Decimal,
    pub total_amount: Decimal,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MilkSaleRow> for MilkSale {
    type Error = StoreError;

    fn try_from(row: MilkSaleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            farm_id: row.farm_id,
            date: row.date,
            quantity_sold: row.quantity_sold,
            price_per_liter: row.price_per_liter,
            total_amount: row.total_amount,
            recorded_by: UserId::from_uuid(row.recorded_by),
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&MilkSale> for MilkSaleRow {
    type Error = StoreError;

    fn try_from(sale: &MilkSale) -> Result<Self, Self::Error> {
        Ok(Self {
            id: sale.id,
            farm_id: sale.farm_id,
            date: sale.date,
            quantity_sold: sale.quantity_sold,
            price_per_liter: sale.price_per_liter,
            total_amount: sale.total_amount,
            recorded_by: *sale.recorded_by.as_uuid(),
            created_at: sale.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = feeds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeedRow {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub feed_type: String,
    pub quantity_purchased: Decimal,
    pub quantity_remaining: Decimal,
    pub unit_price: Decimal,
    pub transport_cost: Decimal,
    pub purchase_date: NaiveDate,
    pub is_finished: bool,
    pub needs_restock: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FeedRow> for Feed {
    type Error = StoreError;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            farm_id: row.farm_id,
            feed_type: decode_label("feed_type", &row.feed_type, FeedType::parse)?,
            quantity_purchased: row.quantity_purchased,
            quantity_remaining: row.quantity_remaining,
            unit_price: row.unit_price,
            transport_cost: row.transport_cost,
            purchase_date: row.purchase_date,
            is_finished: row.is_finished,
            needs_restock: row.needs_restock,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&Feed> for FeedRow {
    type Error = StoreError;

    fn try_from(feed: &Feed) -> Result<Self, Self::Error> {
        Ok(Self {
            id: feed.id,
            farm_id: feed.farm_id,
            feed_type: feed.feed_type.as_str().to_owned(),
            quantity_purchased: feed.quantity_purchased,
            quantity_remaining: feed.quantity_remaining,
            unit_price: feed.unit_price,
            transport_cost: feed.transport_cost,
            purchase_date: feed.purchase_date,
            is_finished: feed.is_finished,
            needs_restock: feed.needs_restock,
            created_at: feed.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = chicken_feeds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChickenFeedRow {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub feed_name: String,
    pub quantity_purchased: Decimal,
    pub quantity_remaining: Decimal,
    pub cost: Decimal,
    pub purchase_date: NaiveDate,
    pub is_finished: bool,
    pub needs_restock: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ChickenFeedRow> for ChickenFeed {
    type Error = StoreError;

    fn try_from(row: ChickenFeedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            farm_id: row.farm_id,
            feed_name: row.feed_name,
            quantity_purchased: row.quantity_purchased,
            quantity_remaining: row.quantity_remaining,
            cost: row.cost,
            purchase_date: row.purchase_date,
            is_finished: row.is_finished,
            needs_restock: row.needs_restock,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&ChickenFeed> for ChickenFeedRow {
    type Error = StoreError;

    fn try_from(feed: &ChickenFeed) -> Result<Self, Self::Error> {
        Ok(Self {
            id: feed.id,
            farm_id: feed.farm_id,
            feed_name: feed.feed_name.clone(),
            quantity_purchased: feed.quantity_purchased,
            quantity_remaining: feed.quantity_remaining,
            cost: feed.cost,
            purchase_date: feed.purchase_date,
            is_finished: feed.is_finished,
            needs_restock: feed.needs_restock,
            created_at: feed.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = feed_consumption)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeedConsumptionRow {
    pub id: Uuid,
    pub cow_id: Uuid,
    pub feed_id: Uuid,
    pub date: NaiveDate,
    pub quantity_consumed: Decimal,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FeedConsumptionRow> for FeedConsumption {
    type Error = StoreError;

    fn try_from(row: FeedConsumptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            cow_id: row.cow_id,
            feed_id: row.feed_id,
            date: row.date,
            quantity_consumed: row.quantity_consumed,
            recorded_by: UserId::from_uuid(row.recorded_by),
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&FeedConsumption> for FeedConsumptionRow {
    type Error = StoreError;

    fn try_from(record: &FeedConsumption) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            cow_id: record.cow_id,
            feed_id: record.feed_id,
            date: record.date,
            quantity_consumed: record.quantity_consumed,
            recorded_by: *record.recorded_by.as_uuid(),
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = health_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HealthRecordRow {
    pub id: Uuid,
    pub cow_id: Uuid,
    pub date_sick: NaiveDate,
    pub disease_name: String,
    pub date_treated: NaiveDate,
    pub medicine_used: String,
    pub medicine_cost: Decimal,
    pub vet_name: String,
    pub vet_contact: String,
    pub notes: String,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<HealthRecordRow> for HealthRecord {
    type Error = StoreError;

    fn try_from(row: HealthRecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            cow_id: row.cow_id,
            date_sick: row.date_sick,
            disease_name: row.disease_name,
            date_treated: row.date_treated,
            medicine_used: row.medicine_used,
            medicine_cost: row.medicine_cost,
            vet_name: row.vet_name,
            vet_contact: row.vet_contact,
            notes: row.notes,
            recorded_by: UserId::from_uuid(row.recorded_by),
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&HealthRecord> for HealthRecordRow {
    type Error = StoreError;

    fn try_from(record: &HealthRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            cow_id: record.cow_id,
            date_sick: record.date_sick,
            disease_name: record.disease_name.clone(),
            date_treated: record.date_treated,
            medicine_used: record.medicine_used.clone(),
            medicine_cost: record.medicine_cost,
            vet_name: record.vet_name.clone(),
            vet_contact: record.vet_contact.clone(),
            notes: record.notes.clone(),
            recorded_by: *record.recorded_by.as_uuid(),
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = egg_production)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EggProductionRow {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub date: NaiveDate,
    pub eggs_collected: i32,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EggProductionRow> for EggProduction {
    type Error = StoreError;

    fn try_from(row: EggProductionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            batch_id: row.batch_id,
            date: row.date,
            eggs_collected: count_from_db("eggs_collected", row.eggs_collected)?,
            recorded_by: UserId::from_uuid(row.recorded_by),
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&EggProduction> for EggProductionRow {
    type Error = StoreError;

    fn try_from(record: &EggProduction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            batch_id: record.batch_id,
            date: record.date,
            eggs_collected: count_to_db("eggs_collected", record.eggs_collected)?,
            recorded_by: *record.recorded_by.as_uuid(),
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = restock_alerts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestockAlertRow {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub alert_type: String,
    pub item_name: String,
    pub message: String,
    pub is_resolved: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl RestockAlertRow {
    /// New unresolved alert row for `draft`.
    pub(crate) fn open(draft: &RestockAlertDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            farm_id: draft.farm_id,
            alert_type: draft.alert_type.as_str().to_owned(),
            item_name: draft.item_name.clone(),
            message: draft.message.clone(),
            is_resolved: false,
            created_by: *draft.created_by.as_uuid(),
            created_at: now,
        }
    }
}

impl TryFrom<RestockAlertRow> for RestockAlert {
    type Error = StoreError;

    fn try_from(row: RestockAlertRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            farm_id: row.farm_id,
            alert_type: decode_label("alert_type", &row.alert_type, AlertType::parse)?,
            item_name: row.item_name,
            message: row.message,
            is_resolved: row.is_resolved,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        })
    }
}
