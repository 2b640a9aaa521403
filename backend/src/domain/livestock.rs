//! Cattle and poultry: animals with lineage and lifecycle stage, and chicken
//! batches whose head count moves only through mortality and hatching.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::records::{Lineage, Ownership, Record, RecordContext, Reference};
use super::scope::ResourceKind;
use super::validation::{FieldError, limits, required_text};

/// Largest head count or batch number a batch may hold.
pub const MAX_BIRD_COUNT: u32 = i32::MAX as u32;

/// Lifecycle stage of an animal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    #[default]
    Calf,
    Heifer,
    Pregnant,
    Lactating,
    Dry,
    Heat,
}

impl LifecycleStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calf => "calf",
            Self::Heifer => "heifer",
            Self::Pregnant => "pregnant",
            Self::Lactating => "lactating",
            Self::Dry => "dry",
            Self::Heat => "heat",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "calf" => Some(Self::Calf),
            "heifer" => Some(Self::Heifer),
            "pregnant" => Some(Self::Pregnant),
            "lactating" => Some(Self::Lactating),
            "dry" => Some(Self::Dry),
            "heat" => Some(Self::Heat),
            _ => None,
        }
    }
}

/// Calf listed on its mother's read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CalfSummary {
    pub id: Uuid,
    pub name: String,
}

/// A cow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Animal {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub stage: LifecycleStage,
    pub mother_id: Option<Uuid>,
    pub birth_date: NaiveDate,
    pub ai_date: Option<NaiveDate>,
    pub estimated_birth: Option<NaiveDate>,
    pub actual_birth: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    /// Filled by stores on reads; ignored on writes.
    #[serde(default)]
    pub calves: Vec<CalfSummary>,
}

/// Client-writable animal fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct AnimalDraft {
    pub farm_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub stage: LifecycleStage,
    #[serde(default)]
    pub mother_id: Option<Uuid>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub ai_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_birth: Option<NaiveDate>,
    #[serde(default)]
    pub actual_birth: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

/// Attributes of a calf registered against its mother. The farm and mother
/// come from the mother record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct CalfDraft {
    pub name: String,
    #[serde(default)]
    pub stage: LifecycleStage,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub ai_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_birth: Option<NaiveDate>,
    #[serde(default)]
    pub actual_birth: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl CalfDraft {
    /// Attach the calf to `mother`.
    pub fn born_to(self, mother: &Animal) -> AnimalDraft {
        AnimalDraft {
            farm_id: mother.farm_id,
            name: self.name,
            stage: self.stage,
            mother_id: Some(mother.id),
            birth_date: self.birth_date,
            ai_date: self.ai_date,
            estimated_birth: self.estimated_birth,
            actual_birth: self.actual_birth,
            notes: self.notes,
        }
    }
}

impl Animal {
    fn from_draft(
        id: Uuid,
        draft: AnimalDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        if draft.mother_id == Some(id) {
            return Err(FieldError::new(
                "mother_id",
                "lineage_cycle",
                "an animal cannot be its own mother",
            ));
        }
        Ok(Self {
            id,
            farm_id: draft.farm_id,
            name: required_text("name", &draft.name, limits::SHORT_TEXT)?,
            stage: draft.stage,
            mother_id: draft.mother_id,
            birth_date: draft.birth_date,
            ai_date: draft.ai_date,
            estimated_birth: draft.estimated_birth,
            actual_birth: draft.actual_birth,
            notes: draft.notes.trim().to_owned(),
            created_at,
            calves: Vec::new(),
        })
    }
}

impl Record for Animal {
    type Draft = AnimalDraft;
    const KIND: ResourceKind = ResourceKind::Animal;
    const OWNERSHIP: Ownership = Ownership::Farm;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.farm_id
    }

    fn references(draft: &AnimalDraft) -> Vec<Reference> {
        let mut refs = vec![Reference::Farm(draft.farm_id)];
        refs.extend(draft.mother_id.map(Reference::Mother));
        refs
    }

    fn lineage(draft: &AnimalDraft) -> Option<Lineage> {
        draft.mother_id.map(|mother_id| Lineage {
            farm_id: draft.farm_id,
            mother_id,
        })
    }

    fn create(id: Uuid, draft: AnimalDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, ctx.now)
    }

    /// A mother stays on her farm while calves are linked to her.
    fn replace(&self, draft: AnimalDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        if draft.farm_id != self.farm_id && !self.calves.is_empty() {
            return Err(FieldError::new(
                "farm_id",
                "calves_on_farm",
                format!(
                    "{} has {} calves on her current farm",
                    self.name,
                    self.calves.len()
                ),
            ));
        }
        Self::from_draft(self.id, draft, self.created_at)
    }
}

/// A batch of chickens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChickenBatch {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub batch_name: String,
    pub batch_number: u32,
    pub initial_count: u32,
    pub current_count: u32,
    pub purchase_date: NaiveDate,
    pub hatch_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Client-writable batch fields. `current_count` is server-managed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ChickenBatchDraft {
    pub farm_id: Uuid,
    pub batch_name: String,
    pub batch_number: u32,
    pub initial_count: u32,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub hatch_date: Option<NaiveDate>,
}

fn bird_count(field: &'static str, value: u32) -> Result<u32, FieldError> {
    if value > MAX_BIRD_COUNT {
        return Err(FieldError::new(
            field,
            "too_large",
            format!("{field} must not exceed {MAX_BIRD_COUNT}"),
        ));
    }
    Ok(value)
}

impl ChickenBatch {
    fn from_draft(
        id: Uuid,
        draft: ChickenBatchDraft,
        current_count: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        let initial_count = bird_count("initial_count", draft.initial_count)?;
        Ok(Self {
            id,
            farm_id: draft.farm_id,
            batch_name: required_text("batch_name", &draft.batch_name, limits::SHORT_TEXT)?,
            batch_number: bird_count("batch_number", draft.batch_number)?,
            initial_count,
            current_count: current_count.unwrap_or(initial_count),
            purchase_date: draft.purchase_date,
            hatch_date: draft.hatch_date,
            created_at,
        })
    }
}

impl Record for ChickenBatch {
    type Draft = ChickenBatchDraft;
    const KIND: ResourceKind = ResourceKind::ChickenBatch;
    const OWNERSHIP: Ownership = Ownership::Farm;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.farm_id
    }

    fn references(draft: &ChickenBatchDraft) -> Vec<Reference> {
        vec![Reference::Farm(draft.farm_id)]
    }

    fn create(id: Uuid, draft: ChickenBatchDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, None, ctx.now)
    }

    /// Carries the last-read count; stores keep their own on write.
    fn replace(&self, draft: ChickenBatchDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(self.id, draft, Some(self.current_count), self.created_at)
    }
}

/// Change to a batch head count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountAdjustment {
    /// Birds lost; the count never drops below zero.
    Deaths(u32),
    /// Birds hatched into the batch.
    Hatched(u32),
}

impl CountAdjustment {
    fn invalid(field: &'static str) -> FieldError {
        FieldError::new(
            field,
            "invalid_count",
            format!("{field} must be a non-negative integer"),
        )
    }

    fn parse(field: &'static str, raw: i64) -> Result<u32, FieldError> {
        u32::try_from(raw).map_err(|_| Self::invalid(field))
    }

    /// Validate a raw mortality count. Counts beyond `u32::MAX` saturate,
    /// which still empties the batch.
    pub fn deaths(raw: i64) -> Result<Self, FieldError> {
        if raw < 0 {
            return Err(Self::invalid("deaths"));
        }
        Ok(Self::Deaths(u32::try_from(raw).unwrap_or(u32::MAX)))
    }

    /// Validate a raw hatch count.
    pub fn hatched(raw: i64) -> Result<Self, FieldError> {
        Self::parse("hatched", raw).map(Self::Hatched)
    }

    /// Apply the adjustment to `current`.
    pub fn apply(self, current: u32) -> Result<u32, FieldError> {
        match self {
            Self::Deaths(deaths) => Ok(current.saturating_sub(deaths)),
            Self::Hatched(hatched) => current
                .checked_add(hatched)
                .filter(|total| *total <= MAX_BIRD_COUNT)
                .ok_or_else(|| {
                    FieldError::new(
                        "hatched",
                        "overflow",
                        format!("batch count would exceed {MAX_BIRD_COUNT}"),
                    )
                }),
        }
    }
}
