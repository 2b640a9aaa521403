//! PostgreSQL-backed entity store.
//!
//! One pool serves every port. The port implementations live in sibling
//! modules grouped by concern; this module only owns the pool handle.

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::PooledConnection;

use crate::domain::ports::StoreError;

use super::diesel_helpers::map_pool_error;
use super::pool::DbPool;

/// Diesel implementation of every entity store port.
#[derive(Clone)]
pub struct DieselFarmStore {
    pool: DbPool,
}

impl DieselFarmStore {
    /// Create a store over an existing pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use herdbook::outbound::persistence::{DbPool, DieselFarmStore, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/herdbook")).await?;
    /// let store = DieselFarmStore::new(pool);
    /// # let _ = store;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(super) async fn conn(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, StoreError> {
        self.pool.get().await.map_err(map_pool_error)
    }
}
