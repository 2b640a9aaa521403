//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only talk to domain
//! services, so they stay testable against the in-memory store.

use std::sync::Arc;

use chrono::FixedOffset;
use mockable::Clock;

use crate::domain::ports::{EntityStore, Notifier};
use crate::domain::{
    AccountService, AlertDispatcher, Animal, ChickenBatch, ChickenFeed, EggProduction, Farm, Feed,
    FeedConsumption, HealthRecord, InventoryService, LifecycleService, MilkProduction, MilkSale,
    Record, RecordService, StatsService,
};

/// Domain services used by the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub farms: RecordService<Farm>,
    pub animals: RecordService<Animal>,
    pub chicken_batches: RecordService<ChickenBatch>,
    pub milk_production: RecordService<MilkProduction>,
    pub milk_sales: RecordService<MilkSale>,
    pub feeds: RecordService<Feed>,
    pub chicken_feeds: RecordService<ChickenFeed>,
    pub feed_consumption: RecordService<FeedConsumption>,
    pub health_records: RecordService<HealthRecord>,
    pub egg_production: RecordService<EggProduction>,
    pub lifecycle: LifecycleService,
    pub inventory: InventoryService,
    pub alerts: AlertDispatcher,
    pub stats: StatsService,
}

/// Collaborators shared by every service.
#[derive(Clone)]
pub struct StateDeps {
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    /// Calendar offset used to decide what "today" is.
    pub utc_offset: FixedOffset,
}

impl HttpState {
    /// Wire every service against one entity store.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::FixedOffset;
    /// use herdbook::inbound::http::state::{HttpState, StateDeps};
    /// use herdbook::outbound::memory::InMemoryFarmStore;
    /// use herdbook::outbound::notify::LogNotifier;
    ///
    /// let state = HttpState::from_store(
    ///     Arc::new(InMemoryFarmStore::default()),
    ///     StateDeps {
    ///         notifier: Arc::new(LogNotifier),
    ///         clock: Arc::new(mockable::DefaultClock),
    ///         utc_offset: FixedOffset::east_opt(3 * 3600).expect("valid offset"),
    ///     },
    /// );
    /// let _farms = state.farms.clone();
    /// ```
    pub fn from_store<S: EntityStore>(store: Arc<S>, deps: StateDeps) -> Self {
        let StateDeps {
            notifier,
            clock,
            utc_offset,
        } = deps;
        let records = RecordServices {
            store: &store,
            clock: &clock,
        };
        let animals = records.build::<Animal>();
        let alerts = AlertDispatcher::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifier.clone(),
            clock.clone(),
        );
        Self {
            accounts: AccountService::new(
                store.clone(),
                store.clone(),
                notifier,
                clock.clone(),
            ),
            farms: records.build(),
            lifecycle: LifecycleService::new(animals.clone(), store.clone()),
            animals,
            chicken_batches: records.build(),
            milk_production: records.build(),
            milk_sales: records.build(),
            feeds: records.build(),
            chicken_feeds: records.build(),
            feed_consumption: records.build(),
            health_records: records.build(),
            egg_production: records.build(),
            inventory: InventoryService::new(store.clone(), alerts.clone(), clock.clone()),
            alerts,
            stats: StatsService::new(store.clone(), store, clock, utc_offset),
        }
    }
}

struct RecordServices<'a, S> {
    store: &'a Arc<S>,
    clock: &'a Arc<dyn Clock>,
}

impl<S: EntityStore> RecordServices<'_, S> {
    fn build<R: Record>(&self) -> RecordService<R>
    where
        S: crate::domain::ports::RecordRepository<R>,
    {
        RecordService::new(self.store.clone(), self.store.clone(), self.clock.clone())
    }
}
