//! Feed inventory for cattle and poultry, and per-cow consumption.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::accounts::UserId;
use super::alerts::{AlertType, RestockAlert};
use super::records::{Ownership, Record, RecordContext, Reference};
use super::scope::ResourceKind;
use super::validation::{FieldError, amount, limits, required_text};

/// Cattle feed product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    DairyMeal,
    MaizeJam,
    MaclicSupa,
    MaclicPlus,
    NapierHaySilage,
}

impl FeedType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DairyMeal => "dairy_meal",
            Self::MaizeJam => "maize_jam",
            Self::MaclicSupa => "maclic_supa",
            Self::MaclicPlus => "maclic_plus",
            Self::NapierHaySilage => "napier_hay_silage",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dairy_meal" => Some(Self::DairyMeal),
            "maize_jam" => Some(Self::MaizeJam),
            "maclic_supa" => Some(Self::MaclicSupa),
            "maclic_plus" => Some(Self::MaclicPlus),
            "napier_hay_silage" => Some(Self::NapierHaySilage),
            _ => None,
        }
    }

    /// Name shown to people, used as the restock alert item name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::DairyMeal => "Dairy Meal",
            Self::MaizeJam => "Maize Jam",
            Self::MaclicSupa => "Maclic Supa",
            Self::MaclicPlus => "Maclic Plus",
            Self::NapierHaySilage => "Napier/Hay/Silage",
        }
    }
}

/// A cattle feed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Feed {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub feed_type: FeedType,
    #[schema(value_type = String)]
    pub quantity_purchased: Decimal,
    #[schema(value_type = String)]
    pub quantity_remaining: Decimal,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub transport_cost: Decimal,
    pub purchase_date: NaiveDate,
    pub is_finished: bool,
    pub needs_restock: bool,
    pub created_at: DateTime<Utc>,
}

/// Client-writable cattle feed fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct FeedDraft {
    pub farm_id: Uuid,
    pub feed_type: FeedType,
    #[schema(value_type = String)]
    pub quantity_purchased: Decimal,
    #[schema(value_type = String)]
    pub quantity_remaining: Decimal,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[serde(default)]
    #[schema(value_type = String)]
    pub transport_cost: Decimal,
    pub purchase_date: NaiveDate,
}

impl Feed {
    fn from_draft(
        id: Uuid,
        draft: FeedDraft,
        flags: (bool, bool),
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        let (is_finished, needs_restock) = flags;
        Ok(Self {
            id,
            farm_id: draft.farm_id,
            feed_type: draft.feed_type,
            quantity_purchased: amount(
                "quantity_purchased",
                draft.quantity_purchased,
                limits::AMOUNT,
            )?,
            quantity_remaining: amount(
                "quantity_remaining",
                draft.quantity_remaining,
                limits::AMOUNT,
            )?,
            unit_price: amount("unit_price", draft.unit_price, limits::AMOUNT)?,
            transport_cost: amount("transport_cost", draft.transport_cost, limits::AMOUNT)?,
            purchase_date: draft.purchase_date,
            is_finished,
            needs_restock,
            created_at,
        })
    }
}

impl Record for Feed {
    type Draft = FeedDraft;
    const KIND: ResourceKind = ResourceKind::Feed;
    const OWNERSHIP: Ownership = Ownership::Farm;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.farm_id
    }

    fn references(draft: &FeedDraft) -> Vec<Reference> {
        vec![Reference::Farm(draft.farm_id)]
    }

    fn create(id: Uuid, draft: FeedDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, (false, false), ctx.now)
    }

    fn replace(&self, draft: FeedDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(
            self.id,
            draft,
            (self.is_finished, self.needs_restock),
            self.created_at,
        )
    }
}

/// A poultry feed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChickenFeed {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub feed_name: String,
    #[schema(value_type = String)]
    pub quantity_purchased: Decimal,
    #[schema(value_type = String)]
    pub quantity_remaining: Decimal,
    #[schema(value_type = String)]
    pub cost: Decimal,
    pub purchase_date: NaiveDate,
    pub is_finished: bool,
    pub needs_restock: bool,
    pub created_at: DateTime<Utc>,
}

/// Client-writable poultry feed fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ChickenFeedDraft {
    pub farm_id: Uuid,
    pub feed_name: String,
    #[schema(value_type = String)]
    pub quantity_purchased: Decimal,
    #[schema(value_type = String)]
    pub quantity_remaining: Decimal,
    #[schema(value_type = String)]
    pub cost: Decimal,
    pub purchase_date: NaiveDate,
}

impl ChickenFeed {
    fn from_draft(
        id: Uuid,
        draft: ChickenFeedDraft,
        flags: (bool, bool),
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        let (is_finished, needs_restock) = flags;
        Ok(Self {
            id,
            farm_id: draft.farm_id,
            feed_name: required_text("feed_name", &draft.feed_name, limits::TEXT)?,
            quantity_purchased: amount(
                "quantity_purchased",
                draft.quantity_purchased,
                limits::AMOUNT,
            )?,
            quantity_remaining: amount(
                "quantity_remaining",
                draft.quantity_remaining,
                limits::AMOUNT,
            )?,
            cost: amount("cost", draft.cost, limits::AMOUNT)?,
            purchase_date: draft.purchase_date,
            is_finished,
            needs_restock,
            created_at,
        })
    }
}

impl Record for ChickenFeed {
    type Draft = ChickenFeedDraft;
    const KIND: ResourceKind = ResourceKind::ChickenFeed;
    const OWNERSHIP: Ownership = Ownership::Farm;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.farm_id
    }

    fn references(draft: &ChickenFeedDraft) -> Vec<Reference> {
        vec![Reference::Farm(draft.farm_id)]
    }

    fn create(id: Uuid, draft: ChickenFeedDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, (false, false), ctx.now)
    }

    fn replace(&self, draft: ChickenFeedDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(
            self.id,
            draft,
            (self.is_finished, self.needs_restock),
            self.created_at,
        )
    }
}

/// Feed eaten by one cow on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedConsumption {
    pub id: Uuid,
    pub cow_id: Uuid,
    pub feed_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub quantity_consumed: Decimal,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Client-writable consumption fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct FeedConsumptionDraft {
    pub cow_id: Uuid,
    pub feed_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub quantity_consumed: Decimal,
}

impl FeedConsumption {
    fn from_draft(
        id: Uuid,
        draft: FeedConsumptionDraft,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id,
            cow_id: draft.cow_id,
            feed_id: draft.feed_id,
            date: draft.date,
            quantity_consumed: amount(
                "quantity_consumed",
                draft.quantity_consumed,
                limits::SMALL_AMOUNT,
            )?,
            recorded_by,
            created_at,
        })
    }
}

impl Record for FeedConsumption {
    type Draft = FeedConsumptionDraft;
    const KIND: ResourceKind = ResourceKind::FeedConsumption;
    const OWNERSHIP: Ownership = Ownership::Animal;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.cow_id
    }

    fn references(draft: &FeedConsumptionDraft) -> Vec<Reference> {
        vec![Reference::Animal(draft.cow_id), Reference::Feed(draft.feed_id)]
    }

    fn create(
        id: Uuid,
        draft: FeedConsumptionDraft,
        ctx: &RecordContext,
    ) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, ctx.actor, ctx.now)
    }

    fn replace(
        &self,
        draft: FeedConsumptionDraft,
        _ctx: &RecordContext,
    ) -> Result<Self, FieldError> {
        Self::from_draft(self.id, draft, self.recorded_by, self.created_at)
    }
}

/// Which feed inventory a completion targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    #[default]
    CowFeed,
    ChickenFeed,
}

impl FeedKind {
    /// Alert category raised when this kind of feed runs out.
    pub fn alert_type(self) -> AlertType {
        match self {
            Self::CowFeed => AlertType::CowFeed,
            Self::ChickenFeed => AlertType::ChickenFeed,
        }
    }

    pub fn resource_kind(self) -> ResourceKind {
        match self {
            Self::CowFeed => ResourceKind::Feed,
            Self::ChickenFeed => ResourceKind::ChickenFeed,
        }
    }
}

/// Feed inventory after being marked finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FinishedFeed {
    Cow(Feed),
    Chicken(ChickenFeed),
}

impl FinishedFeed {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Cow(feed) => feed.id,
            Self::Chicken(feed) => feed.id,
        }
    }

    pub fn farm_id(&self) -> Uuid {
        match self {
            Self::Cow(feed) => feed.farm_id,
            Self::Chicken(feed) => feed.farm_id,
        }
    }

    pub fn kind(&self) -> FeedKind {
        match self {
            Self::Cow(_) => FeedKind::CowFeed,
            Self::Chicken(_) => FeedKind::ChickenFeed,
        }
    }

    /// Restock alert item name.
    pub fn item_name(&self) -> &str {
        match self {
            Self::Cow(feed) => feed.feed_type.display_name(),
            Self::Chicken(feed) => feed.feed_name.as_str(),
        }
    }

    /// Flip the depletion flags. Marking twice is a no-op.
    pub fn mark_finished(&mut self) {
        match self {
            Self::Cow(feed) => {
                feed.is_finished = true;
                feed.needs_restock = true;
            }
            Self::Chicken(feed) => {
                feed.is_finished = true;
                feed.needs_restock = true;
            }
        }
    }
}

/// Outcome of marking a feed finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FeedCompletion {
    pub feed: FinishedFeed,
    pub alert: RestockAlert,
    /// False when an unresolved alert for the same item already existed.
    pub alert_created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FeedType::DairyMeal, "Dairy Meal")]
    #[case(FeedType::MaizeJam, "Maize Jam")]
    #[case(FeedType::MaclicSupa, "Maclic Supa")]
    #[case(FeedType::MaclicPlus, "Maclic Plus")]
    #[case(FeedType::NapierHaySilage, "Napier/Hay/Silage")]
    fn feed_types_have_display_names(#[case] feed_type: FeedType, #[case] expected: &str) {
        assert_eq!(feed_type.display_name(), expected);
        assert_eq!(FeedType::parse(feed_type.as_str()), Some(feed_type));
    }

    #[rstest]
    fn transport_cost_defaults_to_zero() {
        let payload = serde_json::json!({
            "farm_id": Uuid::new_v4(),
            "feed_type": "dairy_meal",
            "quantity_purchased": "100",
            "quantity_remaining": "100",
            "unit_price": "35.50",
            "purchase_date": "2024-02-01"
        });
        let draft: FeedDraft = serde_json::from_value(payload).expect("draft decodes");
        assert!(draft.transport_cost.is_zero());
    }

    #[rstest]
    fn marking_finished_is_idempotent() {
        let ctx = RecordContext {
            actor: UserId::random(),
            now: Utc::now(),
        };
        let feed = ChickenFeed::create(
            Uuid::new_v4(),
            ChickenFeedDraft {
                farm_id: Uuid::new_v4(),
                feed_name: "Layers Mash".to_owned(),
                quantity_purchased: Decimal::from(50),
                quantity_remaining: Decimal::from(0),
                cost: Decimal::from(3000),
                purchase_date: NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date"),
            },
            &ctx,
        )
        .expect("valid feed");
        let mut finished = FinishedFeed::Chicken(feed);
        finished.mark_finished();
        let once = finished.clone();
        finished.mark_finished();
        assert_eq!(finished, once);
        assert_eq!(finished.item_name(), "Layers Mash");
        assert_eq!(finished.kind().alert_type(), AlertType::ChickenFeed);
    }
}
