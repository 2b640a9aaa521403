//! bb8 pool of async Diesel PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::domain::ports::define_port_error;

define_port_error! {
    /// Pool construction or checkout failure.
    pub enum PoolError {
        /// No connection freed up before the checkout timeout.
        Checkout { message: String } => "failed to get connection from pool: {message}",
        /// The pool could not be created from its settings.
        Build { message: String } => "failed to build connection pool: {message}",
    }
}

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection pool settings.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use herdbook::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/herdbook")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(2));
/// assert_eq!(config.database_url(), "postgres://localhost/herdbook");
/// assert_eq!(config.max_size(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Ten connections, no idle floor, ten second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: None,
            connection_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Zero is raised to one.
    #[must_use]
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self {
            max_size: max_size.max(1),
            ..self
        }
    }

    /// Connections kept open while idle; capped at the pool size.
    #[must_use]
    pub fn with_min_idle(self, min_idle: u32) -> Self {
        Self {
            min_idle: Some(min_idle.min(self.max_size)),
            ..self
        }
    }

    #[must_use]
    pub fn with_connection_timeout(self, connection_timeout: Duration) -> Self {
        Self {
            connection_timeout,
            ..self
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

/// Cloneable handle to the shared pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Connections open lazily.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when bb8 rejects the settings.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            database_url,
            max_size,
            min_idle,
            connection_timeout,
        } = config;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        Pool::builder()
            .max_size(max_size)
            .min_idle(min_idle)
            .connection_timeout(connection_timeout)
            .build(manager)
            .await
            .map(|inner| Self { inner })
            .map_err(|err| PoolError::build(err.to_string()))
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when the timeout elapses first.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const URL: &str = "postgres://localhost/herdbook";

    #[rstest]
    fn new_uses_the_defaults() {
        let config = PoolConfig::new(URL);
        assert_eq!(config.max_size(), DEFAULT_MAX_SIZE);
        assert_eq!(config.min_idle, None);
        assert_eq!(config.connection_timeout, DEFAULT_CHECKOUT_TIMEOUT);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(25, 25)]
    fn max_size_never_drops_below_one(#[case] requested: u32, #[case] expected: u32) {
        assert_eq!(PoolConfig::new(URL).with_max_size(requested).max_size(), expected);
    }

    #[rstest]
    #[case(2, Some(2))]
    #[case(40, Some(4))]
    fn min_idle_is_capped_by_max_size(#[case] requested: u32, #[case] expected: Option<u32>) {
        let config = PoolConfig::new(URL).with_max_size(4).with_min_idle(requested);
        assert_eq!(config.min_idle, expected);
    }

    #[rstest]
    fn errors_carry_their_cause() {
        assert_eq!(
            PoolError::checkout("timed out").to_string(),
            "failed to get connection from pool: timed out"
        );
    }
}
