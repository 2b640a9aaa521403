//! HTTP inbound adapter exposing REST endpoints.
//!
//! Everything under `/api/v1` is registered by [`configure`]; health probes
//! and documentation are mounted by the server outside that scope.

pub mod alerts;
pub mod error;
pub mod health;
pub mod inventory;
pub mod livestock;
pub mod principal;
pub mod records;
pub mod session;
pub mod session_config;
pub mod state;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every API route together with the extractor error handlers.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use herdbook::inbound::http::configure;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::path_config())
        .app_data(error::query_config())
        .service(users::login)
        .service(users::logout)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::invite_farmer)
        .service(livestock::add_calf)
        .service(livestock::update_mortality)
        .service(livestock::add_hatched)
        .service(inventory::mark_complete)
        .service(alerts::list_alerts)
        .service(alerts::get_alert)
        .service(alerts::resolve_alert)
        .service(stats::milk_stats)
        .service(stats::egg_stats)
        .configure(records::configure);
}
