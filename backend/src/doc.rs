//! OpenAPI document for the REST API.
//!
//! Hand-written handlers are listed in [`ApiDoc`]; the generated record
//! resources contribute their own fragments through
//! [`crate::inbound::http::records::merge_docs`]. Use [`openapi`] to get the
//! complete document.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::records;

/// Registers the session cookie scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Herdbook API",
        description = "Livestock, production and feed records for admin and farm accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::invite_farmer,
        crate::inbound::http::livestock::add_calf,
        crate::inbound::http::livestock::update_mortality,
        crate::inbound::http::livestock::add_hatched,
        crate::inbound::http::inventory::mark_complete,
        crate::inbound::http::alerts::list_alerts,
        crate::inbound::http::alerts::get_alert,
        crate::inbound::http::alerts::resolve_alert,
        crate::inbound::http::stats::milk_stats,
        crate::inbound::http::stats::egg_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "users", description = "Sessions and accounts"),
        (name = "farms", description = "Farms"),
        (name = "livestock", description = "Animals and chicken batches"),
        (name = "production", description = "Milk, sales and eggs"),
        (name = "feed", description = "Feed inventory and consumption"),
        (name = "alerts", description = "Restock alerts"),
        (name = "stats", description = "Production totals"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

/// Full document: [`ApiDoc`] plus every record resource.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    records::merge_docs(&mut doc);
    doc
}
