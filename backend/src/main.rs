//! Herdbook entry point: loads settings, picks the store and serves the API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use herdbook::inbound::http::health::HealthState;
use herdbook::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{AppSettings, ServerConfig, build_http_state, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let http_state = build_http_state(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(session, bind_addr, http_state),
    )?;
    info!(%bind_addr, "herdbook listening");
    let outcome = server.await;
    health_state.mark_draining();
    outcome
}
