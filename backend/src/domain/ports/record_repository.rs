//! Ports for scoped record persistence and reference resolution.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::records::{Record, Reference};
use crate::domain::scope::Scope;

use super::StoreError;

/// Generic persistence for one kind of farm record.
///
/// Reads are filtered by [`Scope`]: a record whose owning farm lies outside
/// the scope is indistinguishable from an absent one. Writes are unscoped;
/// callers check visibility first.
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync {
    /// Every record visible under `scope`.
    async fn list(&self, scope: &Scope) -> Result<Vec<R>, StoreError>;

    /// The record with `id`, if visible under `scope`.
    async fn find(&self, id: Uuid, scope: &Scope) -> Result<Option<R>, StoreError>;

    /// Persist a new record and return its stored form.
    async fn insert(&self, record: &R) -> Result<R, StoreError>;

    /// Overwrite an existing record and return its stored form.
    async fn update(&self, record: &R) -> Result<R, StoreError>;

    /// Delete a record and its dependents. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Resolves payload references to the farms that own them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Owning farm of the referenced record, or `None` when it does not exist.
    async fn farm_of(&self, reference: Reference) -> Result<Option<Uuid>, StoreError>;

    /// Mother of `animal_id`, or `None` for a root animal or unknown id.
    async fn mother_of(&self, animal_id: Uuid) -> Result<Option<Uuid>, StoreError>;
}
