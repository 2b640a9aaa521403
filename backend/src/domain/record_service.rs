//! Generic scoped CRUD over farm records.
//!
//! Reads go through the caller's [`Scope`]; anything outside it is reported
//! as missing. Writes also check every reference in the payload so a farmer
//! cannot attach records to another farm's animals, batches or feeds.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{RecordRepository, ReferenceLookup};
use crate::domain::records::{Record, RecordContext, Reference};
use crate::domain::scope::{ResourceKind, Scope, resolve_scope};
use crate::domain::validation::FieldError;
use crate::domain::{Error, Principal};

/// Scoped create, read, replace and delete for one record kind.
pub struct RecordService<R: Record> {
    repo: Arc<dyn RecordRepository<R>>,
    references: Arc<dyn ReferenceLookup>,
    clock: Arc<dyn Clock>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for RecordService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            references: Arc::clone(&self.references),
            clock: Arc::clone(&self.clock),
            _record: PhantomData,
        }
    }
}

impl<R: Record> RecordService<R> {
    /// Create a service over `repo`.
    pub fn new(
        repo: Arc<dyn RecordRepository<R>>,
        references: Arc<dyn ReferenceLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            references,
            clock,
            _record: PhantomData,
        }
    }

    fn not_found(id: Uuid) -> Error {
        Error::not_found(format!("{} {id} not found", R::KIND.label()))
    }

    fn forbidden() -> Error {
        Error::forbidden(format!(
            "not permitted to write {} records",
            R::KIND.label()
        ))
    }

    /// Every record visible to `principal`.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<R>, Error> {
        let scope = resolve_scope(principal, R::KIND);
        if scope == Scope::Nothing {
            return Ok(Vec::new());
        }
        Ok(self.repo.list(&scope).await?)
    }

    /// The record with `id`, or not found when it is absent or out of scope.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<R, Error> {
        let scope = resolve_scope(principal, R::KIND);
        if scope == Scope::Nothing {
            return Err(Self::not_found(id));
        }
        self.repo
            .find(id, &scope)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Validate and store a new record.
    pub async fn create(&self, principal: &Principal, draft: R::Draft) -> Result<R, Error> {
        let scope = resolve_scope(principal, R::KIND);
        if scope == Scope::Nothing || (R::KIND == ResourceKind::Farm && !principal.is_admin()) {
            return Err(Self::forbidden());
        }
        self.check_references(principal, &scope, &draft).await?;
        self.check_lineage(None, &draft).await?;

        let ctx = self.context(principal);
        let record = R::create(Uuid::new_v4(), draft, &ctx)?;
        let stored = self.repo.insert(&record).await?;
        debug!(kind = R::KIND.label(), id = %stored.id(), "record created");
        Ok(stored)
    }

    /// Replace the client-writable fields of a visible record.
    pub async fn replace(
        &self,
        principal: &Principal,
        id: Uuid,
        draft: R::Draft,
    ) -> Result<R, Error> {
        let current = self.get(principal, id).await?;
        let scope = resolve_scope(principal, R::KIND);
        self.check_references(principal, &scope, &draft).await?;
        self.check_lineage(Some(id), &draft).await?;

        let ctx = self.context(principal);
        let record = current.replace(draft, &ctx)?;
        let stored = self.repo.update(&record).await?;
        debug!(kind = R::KIND.label(), %id, "record replaced");
        Ok(stored)
    }

    /// Delete a visible record together with its dependents.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), Error> {
        self.get(principal, id).await?;
        if !self.repo.delete(id).await? {
            return Err(Self::not_found(id));
        }
        debug!(kind = R::KIND.label(), %id, "record deleted");
        Ok(())
    }

    fn context(&self, principal: &Principal) -> RecordContext {
        RecordContext {
            actor: principal.user_id,
            now: self.clock.utc(),
        }
    }

    async fn check_references(
        &self,
        principal: &Principal,
        scope: &Scope,
        draft: &R::Draft,
    ) -> Result<(), Error> {
        for reference in R::references(draft) {
            let owner = self.references.farm_of(reference).await?;
            match owner {
                Some(farm_id) if scope.admits_farm(farm_id) => {}
                None if principal.is_admin() => return Err(unknown_reference(reference).into()),
                _ => return Err(Self::forbidden()),
            }
        }
        Ok(())
    }

    /// Reject mothers from another farm and mother links that would make an
    /// animal its own ancestor.
    async fn check_lineage(&self, animal_id: Option<Uuid>, draft: &R::Draft) -> Result<(), Error> {
        let Some(lineage) = R::lineage(draft) else {
            return Ok(());
        };
        let mother_farm = self
            .references
            .farm_of(Reference::Mother(lineage.mother_id))
            .await?;
        if mother_farm != Some(lineage.farm_id) {
            return Err(FieldError::new(
                "mother_id",
                "mother_other_farm",
                "mother must belong to the same farm",
            )
            .into());
        }

        let Some(animal_id) = animal_id else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        let mut cursor = Some(lineage.mother_id);
        while let Some(ancestor) = cursor {
            if ancestor == animal_id {
                return Err(FieldError::new(
                    "mother_id",
                    "lineage_cycle",
                    "an animal cannot be its own ancestor",
                )
                .into());
            }
            if !seen.insert(ancestor) {
                break;
            }
            cursor = self.references.mother_of(ancestor).await?;
        }
        Ok(())
    }
}

fn unknown_reference(reference: Reference) -> FieldError {
    FieldError::new(
        reference.field(),
        "unknown_reference",
        format!(
            "{} {} does not exist",
            reference.kind().label(),
            reference.id()
        ),
    )
}

#[cfg(test)]
#[path = "record_service_tests.rs"]
mod tests;
