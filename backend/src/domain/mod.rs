//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the farm record model, the access scoping rules and the
//! workflows built on them (feed depletion alerts, lifecycle operations,
//! production statistics). Types here know nothing about HTTP or SQL;
//! adapters reach them through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Principal / Scope — who is asking and what they may see.
//! - RecordService and the workflow services.

pub mod accounts;
pub mod alerts;
pub mod error;
pub mod farm;
pub mod feed;
pub mod health;
pub mod livestock;
pub mod notice;
pub mod ports;
pub mod production;
pub mod records;
pub mod scope;
pub mod stats;
pub mod trace_id;
pub mod validation;

mod account_service;
mod alert_dispatcher;
mod inventory_service;
mod lifecycle_service;
mod record_service;
mod stats_service;
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::{AccountService, Landing, LoginOutcome};
pub use self::accounts::{
    Account, FarmerInvite, Invitation, LoginCredentials, LoginValidationError, PasswordDigest,
    Principal, Role, UserId,
};
pub use self::alert_dispatcher::AlertDispatcher;
pub use self::alerts::{AlertContext, AlertType, RestockAlert, RestockAlertDraft};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::farm::{Farm, FarmDraft};
pub use self::feed::{
    ChickenFeed, ChickenFeedDraft, Feed, FeedCompletion, FeedConsumption, FeedConsumptionDraft,
    FeedDraft, FeedKind, FeedType, FinishedFeed,
};
pub use self::health::{HealthRecord, HealthRecordDraft};
pub use self::inventory_service::InventoryService;
pub use self::lifecycle_service::LifecycleService;
pub use self::livestock::{
    Animal, AnimalDraft, CalfDraft, CalfSummary, ChickenBatch, ChickenBatchDraft, CountAdjustment,
    LifecycleStage,
};
pub use self::notice::Notice;
pub use self::production::{
    EggProduction, EggProductionDraft, MilkProduction, MilkProductionDraft, MilkSale,
    MilkSaleDraft, MilkSession,
};
pub use self::record_service::RecordService;
pub use self::records::{Lineage, Ownership, Record, RecordContext, Reference};
pub use self::scope::{FARMER_RULES, FarmerRule, ResourceKind, Scope, resolve_scope};
pub use self::stats::{AggregationWindow, Metric, Period, ProductionTotals};
pub use self::stats_service::StatsService;
pub use self::trace_id::TraceId;

