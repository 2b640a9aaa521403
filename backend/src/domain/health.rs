//! Veterinary treatment records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::accounts::UserId;
use super::records::{Ownership, Record, RecordContext, Reference};
use super::scope::ResourceKind;
use super::validation::{FieldError, amount, limits, optional_text, required_text};

/// A sickness episode and its treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRecord {
    pub id: Uuid,
    pub cow_id: Uuid,
    pub date_sick: NaiveDate,
    pub disease_name: String,
    pub date_treated: NaiveDate,
    pub medicine_used: String,
    #[schema(value_type = String, example = "1500.00")]
    pub medicine_cost: Decimal,
    pub vet_name: String,
    pub vet_contact: String,
    pub notes: String,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Client-writable health record fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct HealthRecordDraft {
    pub cow_id: Uuid,
    pub date_sick: NaiveDate,
    pub disease_name: String,
    pub date_treated: NaiveDate,
    pub medicine_used: String,
    #[schema(value_type = String, example = "1500.00")]
    pub medicine_cost: Decimal,
    pub vet_name: String,
    pub vet_contact: String,
    #[serde(default)]
    pub notes: String,
}

impl HealthRecord {
    fn from_draft(
        id: Uuid,
        draft: HealthRecordDraft,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id,
            cow_id: draft.cow_id,
            date_sick: draft.date_sick,
            disease_name: required_text("disease_name", &draft.disease_name, limits::TEXT)?,
            date_treated: draft.date_treated,
            medicine_used: required_text("medicine_used", &draft.medicine_used, limits::TEXT)?,
            medicine_cost: amount("medicine_cost", draft.medicine_cost, limits::AMOUNT)?,
            vet_name: required_text("vet_name", &draft.vet_name, limits::TEXT)?,
            vet_contact: required_text("vet_contact", &draft.vet_contact, limits::PHONE)?,
            notes: optional_text("notes", &draft.notes, usize::MAX)?,
            recorded_by,
            created_at,
        })
    }
}

impl Record for HealthRecord {
    type Draft = HealthRecordDraft;
    const KIND: ResourceKind = ResourceKind::HealthRecord;
    const OWNERSHIP: Ownership = Ownership::Animal;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.cow_id
    }

    fn references(draft: &HealthRecordDraft) -> Vec<Reference> {
        vec![Reference::Animal(draft.cow_id)]
    }

    fn create(id: Uuid, draft: HealthRecordDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, ctx.actor, ctx.now)
    }

    fn replace(&self, draft: HealthRecordDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(self.id, draft, self.recorded_by, self.created_at)
    }
}
