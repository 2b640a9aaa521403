//! Choose the store and notifier adapters from settings and wire the HTTP
//! state over them.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use herdbook::domain::ports::Notifier;
use herdbook::inbound::http::state::{HttpState, StateDeps};
use herdbook::outbound::memory::InMemoryFarmStore;
use herdbook::outbound::notify::{HttpRelayNotifier, LogNotifier};
use herdbook::outbound::persistence::{DbPool, DieselFarmStore, run_pending_migrations};

use super::settings::AppSettings;

fn build_notifier(settings: &AppSettings) -> std::io::Result<Arc<dyn Notifier>> {
    let endpoint = settings.notifier_endpoint().map_err(std::io::Error::other)?;
    let Some(endpoint) = endpoint else {
        info!("no notifier relay configured; notices are logged only");
        return Ok(Arc::new(LogNotifier));
    };
    info!(%endpoint, "notices are sent through the mail relay");
    let relay = HttpRelayNotifier::new(
        endpoint,
        settings.notifier_from().to_owned(),
        settings.notifier_timeout(),
    )
    .map_err(|err| std::io::Error::other(format!("notifier client: {err}")))?;
    Ok(Arc::new(relay))
}

/// Build the handler state, migrating the database first when one is
/// configured. Also creates the bootstrap admin when requested.
///
/// # Errors
///
/// Returns [`std::io::Error`] when settings are invalid, the database cannot
/// be reached or migrated, or the bootstrap admin cannot be stored.
pub async fn build_http_state(settings: &AppSettings) -> std::io::Result<HttpState> {
    let deps = StateDeps {
        notifier: build_notifier(settings)?,
        clock: Arc::new(DefaultClock),
        utc_offset: settings.utc_offset().map_err(std::io::Error::other)?,
    };

    let state = match settings.pool_config() {
        Some(pool_config) => {
            run_pending_migrations(pool_config.database_url().to_owned())
                .await
                .map_err(std::io::Error::other)?;
            let pool = DbPool::new(pool_config)
                .await
                .map_err(std::io::Error::other)?;
            info!("using PostgreSQL store");
            HttpState::from_store(Arc::new(DieselFarmStore::new(pool)), deps)
        }
        None => {
            warn!("no database configured; records live in memory and vanish on restart");
            HttpState::from_store(Arc::new(InMemoryFarmStore::default()), deps)
        }
    };

    if let Some(admin) = settings.bootstrap_admin().map_err(std::io::Error::other)? {
        let created = state
            .accounts
            .ensure_admin(&admin.username, &admin.email, &admin.password)
            .await
            .map_err(|err| std::io::Error::other(format!("bootstrap admin: {err}")))?;
        if !created {
            info!(username = %admin.username, "bootstrap admin already exists");
        }
    }
    Ok(state)
}
