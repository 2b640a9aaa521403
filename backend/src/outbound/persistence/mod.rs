//! PostgreSQL adapter for the entity store ports.
//!
//! Row structs and the Diesel schema stay private to this module; callers
//! only see [`DieselFarmStore`], the pool types and the migration runner.
//! Every port maps database failures to `StoreError` in `diesel_helpers`.

mod diesel_account_repository;
mod diesel_alert_repository;
mod diesel_farm_store;
pub(crate) mod diesel_helpers;
mod diesel_inventory_repository;
mod diesel_livestock_repository;
mod diesel_record_repository;
mod diesel_stats_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_farm_store::DieselFarmStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
