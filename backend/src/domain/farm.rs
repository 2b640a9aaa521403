//! Farms, the root of all scoping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::records::{Ownership, Record, RecordContext, Reference};
use super::scope::ResourceKind;
use super::validation::{FieldError, limits, required_text};

/// A farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Farm {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// Client-writable farm fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct FarmDraft {
    pub name: String,
    pub location: String,
}

impl Farm {
    fn from_draft(
        id: Uuid,
        draft: FarmDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id,
            name: required_text("name", &draft.name, limits::TEXT)?,
            location: required_text("location", &draft.location, limits::TEXT)?,
            created_at,
        })
    }
}

impl Record for Farm {
    type Draft = FarmDraft;
    const KIND: ResourceKind = ResourceKind::Farm;
    const OWNERSHIP: Ownership = Ownership::Farm;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.id
    }

    fn references(_draft: &FarmDraft) -> Vec<Reference> {
        Vec::new()
    }

    fn create(id: Uuid, draft: FarmDraft, ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(id, draft, ctx.now)
    }

    fn replace(&self, draft: FarmDraft, _ctx: &RecordContext) -> Result<Self, FieldError> {
        Self::from_draft(self.id, draft, self.created_at)
    }
}
