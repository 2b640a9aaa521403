//! Lifecycle operations: calving, batch mortality and hatching.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::livestock::{Animal, CalfDraft, ChickenBatch, CountAdjustment};
use crate::domain::ports::BatchCountRepository;
use crate::domain::record_service::RecordService;
use crate::domain::scope::{ResourceKind, Scope, resolve_scope};
use crate::domain::{Error, Principal};

#[derive(Clone)]
pub struct LifecycleService {
    animals: RecordService<Animal>,
    batches: Arc<dyn BatchCountRepository>,
}

impl LifecycleService {
    pub fn new(animals: RecordService<Animal>, batches: Arc<dyn BatchCountRepository>) -> Self {
        Self { animals, batches }
    }

    /// Register a calf born to a visible mother. The calf joins the mother's
    /// farm.
    pub async fn add_calf(
        &self,
        principal: &Principal,
        mother_id: Uuid,
        calf: CalfDraft,
    ) -> Result<Animal, Error> {
        let mother = self.animals.get(principal, mother_id).await?;
        let calf = self.animals.create(principal, calf.born_to(&mother)).await?;
        info!(%mother_id, calf_id = %calf.id, "calf registered");
        Ok(calf)
    }

    /// Record `deaths` birds lost. The count bottoms out at zero.
    pub async fn update_mortality(
        &self,
        principal: &Principal,
        batch_id: Uuid,
        deaths: i64,
    ) -> Result<ChickenBatch, Error> {
        let adjustment = CountAdjustment::deaths(deaths)?;
        self.adjust(principal, batch_id, adjustment).await
    }

    /// Record `hatched` new birds.
    pub async fn add_hatched(
        &self,
        principal: &Principal,
        batch_id: Uuid,
        hatched: i64,
    ) -> Result<ChickenBatch, Error> {
        let adjustment = CountAdjustment::hatched(hatched)?;
        self.adjust(principal, batch_id, adjustment).await
    }

    async fn adjust(
        &self,
        principal: &Principal,
        batch_id: Uuid,
        adjustment: CountAdjustment,
    ) -> Result<ChickenBatch, Error> {
        let not_found = || Error::not_found(format!("chicken batch {batch_id} not found"));
        let scope = resolve_scope(principal, ResourceKind::ChickenBatch);
        if scope == Scope::Nothing {
            return Err(not_found());
        }
        let batch = self
            .batches
            .adjust_count(batch_id, &scope, adjustment)
            .await?
            .ok_or_else(not_found)?;
        info!(%batch_id, ?adjustment, current_count = batch.current_count, "batch count adjusted");
        Ok(batch)
    }
}
