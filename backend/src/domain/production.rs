//! Milk and egg production, and milk sales.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::accounts::UserId;
use super::records::{Ownership, Record, RecordContext, Reference};
use super::scope::ResourceKind;
use super::validation::{FieldError, amount, limits};

/// Milking session within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MilkSession {
    Morning,
    Afternoon,
    Evening,
}

impl MilkSession {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            "evening" => Some(Self::Evening),
            _ => None,
        }
    }
}

/// Milk yield of one cow for one session. Unique per (cow, date, session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MilkProduction {
    pub id: Uuid,
    pub cow_id: Uuid,
    pub date: NaiveDate,
    pub session: MilkSession,
    #[schema(value_type = String, example = "12.50")]
    pub quantity: Decimal,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Client-writable milk production fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct MilkProductionDraft {
    pub cow_id: Uuid,
    pub date: NaiveDate,
    pub session: MilkSession,
    #[schema(value_type = String, example = "12.50")]
    pub quantity: Decimal,
}

impl MilkProduction {
    fn from_draft(
        id: Uuid,
        draft: MilkProductionDraft,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id,
            cow_id: draft.cow_id,
            date: draft.date,
            session: draft.session,
            quantity: amount("quantity", draft.quantity, limits::MILK_QUANTITY)?,
            recorded_by,
            created_at,
        })
    }
}

impl Record for MilkProduction {
    type Draft = MilkProductionDraft;
    const KIND: ResourceKind = ResourceKind::MilkProduction;
    const OWNERSHIP: Ownership = Ownership::Animal;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.cow_id
    }

    fn references(draft: &MilkProductionDraft) -> Vec<Reference> {
        vec![Reference::Animal(draft.cow_id)]
    }

    fn create(
        id: Uuid,
        draft: MilkProductionDraft,
        ctx: &RecordContext,
    ) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, ctx.actor, ctx.now)
    }

    fn replace(&self, draft: MilkProductionDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(self.id, draft, self.recorded_by, self.created_at)
    }
}

/// A farm's milk sale. `total_amount` is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MilkSale {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "40.00")]
    pub quantity_sold: Decimal,
    #[schema(value_type = String, example = "55.00")]
    pub price_per_liter: Decimal,
    #[schema(value_type = String, example = "2200.00")]
    pub total_amount: Decimal,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Client-writable milk sale fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct MilkSaleDraft {
    pub farm_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "40.00")]
    pub quantity_sold: Decimal,
    #[schema(value_type = String, example = "55.00")]
    pub price_per_liter: Decimal,
}

impl MilkSale {
    fn from_draft(
        id: Uuid,
        draft: MilkSaleDraft,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        let quantity_sold = amount("quantity_sold", draft.quantity_sold, limits::AMOUNT)?;
        let price_per_liter = amount("price_per_liter", draft.price_per_liter, limits::SMALL_AMOUNT)?;
        let total_amount = amount(
            "total_amount",
            (quantity_sold * price_per_liter)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            limits::TOTAL,
        )?;
        Ok(Self {
            id,
            farm_id: draft.farm_id,
            date: draft.date,
            quantity_sold,
            price_per_liter,
            total_amount,
            recorded_by,
            created_at,
        })
    }
}

impl Record for MilkSale {
    type Draft = MilkSaleDraft;
    const KIND: ResourceKind = ResourceKind::MilkSale;
    const OWNERSHIP: Ownership = Ownership::Farm;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.farm_id
    }

    fn references(draft: &MilkSaleDraft) -> Vec<Reference> {
        vec![Reference::Farm(draft.farm_id)]
    }

    fn create(id: Uuid, draft: MilkSaleDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, ctx.actor, ctx.now)
    }

    fn replace(&self, draft: MilkSaleDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(self.id, draft, self.recorded_by, self.created_at)
    }
}

/// Eggs collected from a batch on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EggProduction {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub date: NaiveDate,
    pub eggs_collected: u32,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Client-writable egg production fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct EggProductionDraft {
    pub batch_id: Uuid,
    pub date: NaiveDate,
    pub eggs_collected: u32,
}

impl EggProduction {
    fn from_draft(
        id: Uuid,
        draft: EggProductionDraft,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        if i32::try_from(draft.eggs_collected).is_err() {
            return Err(FieldError::new(
                "eggs_collected",
                "too_large",
                "eggs_collected is out of range",
            ));
        }
        Ok(Self {
            id,
            batch_id: draft.batch_id,
            date: draft.date,
            eggs_collected: draft.eggs_collected,
            recorded_by,
            created_at,
        })
    }
}

impl Record for EggProduction {
    type Draft = EggProductionDraft;
    const KIND: ResourceKind = ResourceKind::EggProduction;
    const OWNERSHIP: Ownership = Ownership::Batch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.batch_id
    }

    fn references(draft: &EggProductionDraft) -> Vec<Reference> {
        vec![Reference::Batch(draft.batch_id)]
    }

    fn create(id: Uuid, draft: EggProductionDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, ctx.actor, ctx.now)
    }

    fn replace(&self, draft: EggProductionDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(self.id, draft, self.recorded_by, self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::str::FromStr;

    #[fixture]
    fn ctx() -> RecordContext {
        RecordContext {
            actor: UserId::random(),
            now: Utc::now(),
        }
    }

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("valid decimal literal")
    }

    fn sale_draft(quantity: &str, price: &str) -> MilkSaleDraft {
        MilkSaleDraft {
            farm_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
            quantity_sold: dec(quantity),
            price_per_liter: dec(price),
        }
    }

    #[rstest]
    #[case("40", "55", "2200.00")]
    #[case("12.5", "47.25", "590.63")]
    fn sale_total_is_derived(
        ctx: RecordContext,
        #[case] quantity: &str,
        #[case] price: &str,
        #[case] expected: &str,
    ) {
        let sale = MilkSale::create(Uuid::new_v4(), sale_draft(quantity, price), &ctx)
            .expect("valid sale");
        assert_eq!(sale.total_amount.to_string(), expected);
        assert_eq!(sale.recorded_by, ctx.actor);
    }

    #[rstest]
    fn replacing_a_sale_recomputes_total_and_keeps_recorder(ctx: RecordContext) {
        let sale =
            MilkSale::create(Uuid::new_v4(), sale_draft("10", "50"), &ctx).expect("valid sale");
        let other = RecordContext {
            actor: UserId::random(),
            now: Utc::now(),
        };
        let replaced = sale.replace(sale_draft("20", "50"), &other).expect("valid sale");
        assert_eq!(replaced.total_amount, dec("1000.00"));
        assert_eq!(replaced.recorded_by, sale.recorded_by);
    }

    #[rstest]
    fn milk_quantity_is_capped(ctx: RecordContext) {
        let draft = MilkProductionDraft {
            cow_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
            session: MilkSession::Morning,
            quantity: dec("1000"),
        };
        let err = MilkProduction::create(Uuid::new_v4(), draft, &ctx).expect_err("too large");
        assert_eq!(err.field, "quantity");
    }

    #[rstest]
    fn sale_payload_ignores_client_total() {
        let payload = serde_json::json!({
            "farm_id": Uuid::new_v4(),
            "date": "2024-05-01",
            "quantity_sold": "10.00",
            "price_per_liter": "50.00",
            "total_amount": "1.00"
        });
        let draft: MilkSaleDraft = serde_json::from_value(payload).expect("draft decodes");
        assert_eq!(draft.quantity_sold, dec("10.00"));
    }
}
