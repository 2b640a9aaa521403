//! Shared doubles for domain service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{RecordRepository, StoreError};
use crate::domain::{Farm, Principal, Record, Role, Scope, UserId};

/// Clock frozen at a fixed instant.
pub(crate) struct FixtureClock(pub DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock(fixture_now()))
}

pub(crate) fn admin() -> Principal {
    Principal {
        user_id: UserId::random(),
        role: Role::Admin,
        assigned_farm: None,
    }
}

pub(crate) fn farmer(farm: Option<Uuid>) -> Principal {
    Principal {
        user_id: UserId::random(),
        role: Role::Farmer,
        assigned_farm: farm,
    }
}

pub(crate) fn farm(name: &str) -> Farm {
    Farm {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        location: "Kiambu".to_owned(),
        created_at: fixture_now(),
    }
}

/// Repository over farm-owned records kept in a vector.
pub(crate) struct VecRepository<R> {
    records: Mutex<Vec<R>>,
}

impl<R: Record> VecRepository<R> {
    pub(crate) fn with(records: Vec<R>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
        })
    }

    pub(crate) fn snapshot(&self) -> Vec<R> {
        self.records.lock().expect("records lock").clone()
    }
}

#[async_trait]
impl<R: Record> RecordRepository<R> for VecRepository<R> {
    async fn list(&self, scope: &Scope) -> Result<Vec<R>, StoreError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|record| scope.admits_farm(record.owner_id()))
            .collect())
    }

    async fn find(&self, id: Uuid, scope: &Scope) -> Result<Option<R>, StoreError> {
        Ok(self
            .snapshot()
            .into_iter()
            .find(|record| record.id() == id && scope.admits_farm(record.owner_id())))
    }

    async fn insert(&self, record: &R) -> Result<R, StoreError> {
        self.records
            .lock()
            .expect("records lock")
            .push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &R) -> Result<R, StoreError> {
        let mut records = self.records.lock().expect("records lock");
        for slot in records.iter_mut() {
            if slot.id() == record.id() {
                *slot = record.clone();
            }
        }
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.lock().expect("records lock");
        let before = records.len();
        records.retain(|record| record.id() != id);
        Ok(records.len() != before)
    }
}
