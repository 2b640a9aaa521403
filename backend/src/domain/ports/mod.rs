//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven adapters (the Diesel and in-memory entity stores, notifiers)
//! implement these traits. Services depend on them as trait objects.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod alert_repository;
mod inventory_repository;
mod livestock_repository;
mod notifier;
mod production_stats_repository;
mod record_repository;
mod store_error;

pub use account_repository::AccountRepository;
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use alert_repository::AlertRepository;
#[cfg(test)]
pub use alert_repository::MockAlertRepository;
pub use inventory_repository::InventoryRepository;
#[cfg(test)]
pub use inventory_repository::MockInventoryRepository;
pub use livestock_repository::BatchCountRepository;
#[cfg(test)]
pub use livestock_repository::MockBatchCountRepository;
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notifier, NotifierError};
#[cfg(test)]
pub use production_stats_repository::MockProductionStatsRepository;
pub use production_stats_repository::ProductionStatsRepository;
#[cfg(test)]
pub use record_repository::MockReferenceLookup;
pub use record_repository::{RecordRepository, ReferenceLookup};
pub use store_error::StoreError;

use crate::domain::{
    Animal, ChickenBatch, ChickenFeed, EggProduction, Farm, Feed, FeedConsumption, HealthRecord,
    MilkProduction, MilkSale,
};

/// Everything a complete entity store provides.
///
/// Blanket-implemented, so any adapter implementing the individual ports can
/// back the whole application.
pub trait EntityStore:
    RecordRepository<Farm>
    + RecordRepository<Animal>
    + RecordRepository<ChickenBatch>
    + RecordRepository<MilkProduction>
    + RecordRepository<MilkSale>
    + RecordRepository<Feed>
    + RecordRepository<ChickenFeed>
    + RecordRepository<FeedConsumption>
    + RecordRepository<HealthRecord>
    + RecordRepository<EggProduction>
    + ReferenceLookup
    + AccountRepository
    + BatchCountRepository
    + InventoryRepository
    + AlertRepository
    + ProductionStatsRepository
    + 'static
{
}

impl<T> EntityStore for T where
    T: RecordRepository<Farm>
        + RecordRepository<Animal>
        + RecordRepository<ChickenBatch>
        + RecordRepository<MilkProduction>
        + RecordRepository<MilkSale>
        + RecordRepository<Feed>
        + RecordRepository<ChickenFeed>
        + RecordRepository<FeedConsumption>
        + RecordRepository<HealthRecord>
        + RecordRepository<EggProduction>
        + ReferenceLookup
        + AccountRepository
        + BatchCountRepository
        + InventoryRepository
        + AlertRepository
        + ProductionStatsRepository
        + 'static
{
}
