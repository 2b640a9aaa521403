//! Shared contract for scoped farm records.
//!
//! Every plain resource (farms, animals, batches, production, feed, health)
//! implements [`Record`]. The record service drives create, replace and
//! delete generically through this trait, while stores use
//! [`Record::OWNERSHIP`] to decide how a record reaches its owning farm.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::accounts::UserId;
use super::scope::ResourceKind;
use super::validation::FieldError;

/// Server-side values stamped onto records during writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordContext {
    /// Caller performing the write.
    pub actor: UserId,
    /// Write timestamp.
    pub now: DateTime<Utc>,
}

/// Path from a record to its owning farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The record is a farm, or holds a farm reference directly.
    Farm,
    /// The record belongs to an animal, which belongs to a farm.
    Animal,
    /// The record belongs to a chicken batch, which belongs to a farm.
    Batch,
}

/// Reference to another record supplied in a write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    Farm(Uuid),
    Animal(Uuid),
    Mother(Uuid),
    Batch(Uuid),
    Feed(Uuid),
}

impl Reference {
    /// Referenced identifier.
    pub fn id(self) -> Uuid {
        match self {
            Self::Farm(id)
            | Self::Animal(id)
            | Self::Mother(id)
            | Self::Batch(id)
            | Self::Feed(id) => id,
        }
    }

    /// Payload field that carried the reference.
    pub fn field(self) -> &'static str {
        match self {
            Self::Farm(_) => "farm_id",
            Self::Animal(_) => "cow_id",
            Self::Mother(_) => "mother_id",
            Self::Batch(_) => "batch_id",
            Self::Feed(_) => "feed_id",
        }
    }

    /// Resource kind of the referenced record.
    pub fn kind(self) -> ResourceKind {
        match self {
            Self::Farm(_) => ResourceKind::Farm,
            Self::Animal(_) | Self::Mother(_) => ResourceKind::Animal,
            Self::Batch(_) => ResourceKind::ChickenBatch,
            Self::Feed(_) => ResourceKind::Feed,
        }
    }
}

/// Mother link requested by an animal write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lineage {
    /// Farm the animal will belong to.
    pub farm_id: Uuid,
    /// Requested mother.
    pub mother_id: Uuid,
}

/// A persistent, farm-scoped record with a client-writable draft.
pub trait Record: Clone + Send + Sync + Serialize + 'static {
    /// Client-writable payload accepted by create and replace.
    type Draft: DeserializeOwned + Send + Sync + 'static;

    /// Resource kind used for scope resolution.
    const KIND: ResourceKind;

    /// How the record reaches its owning farm.
    const OWNERSHIP: Ownership;

    /// Record identifier.
    fn id(&self) -> Uuid;

    /// Identifier of the farm, animal or batch that owns the record, per
    /// [`Record::OWNERSHIP`]. Farms own themselves.
    fn owner_id(&self) -> Uuid;

    /// References carried by a draft, validated before every write.
    fn references(draft: &Self::Draft) -> Vec<Reference>;

    /// Mother link requested by a draft, if any.
    fn lineage(_draft: &Self::Draft) -> Option<Lineage> {
        None
    }

    /// Build a new record from a validated draft.
    fn create(id: Uuid, draft: Self::Draft, ctx: &RecordContext) -> Result<Self, FieldError>;

    /// Replace client-writable fields, keeping server-set ones.
    fn replace(&self, draft: Self::Draft, ctx: &RecordContext) -> Result<Self, FieldError>;
}
