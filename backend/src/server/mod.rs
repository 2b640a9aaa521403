//! HTTP server assembly: session cookie, API scope, probes and docs.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::AppSettings;
pub use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::time::Duration;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use herdbook::Trace;
use herdbook::inbound::http::configure;
use herdbook::inbound::http::health::{HealthState, live, ready};
use herdbook::inbound::http::session_config::SessionSettings;
use herdbook::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_COOKIE: &str = "session";
const SESSION_TTL: Duration = Duration::hours(2);

/// Private, http-only cookie session that expires two hours after the last
/// write.
fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(SESSION_TTL))
        .build()
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .wrap(session_middleware(&session))
        .configure(configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", herdbook::doc::openapi()),
    );

    app
}

/// Bind the listener and start serving. Readiness flips on once the socket
/// is bound.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        http_state,
    } = config;
    let worker_health = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(worker_health.clone(), http_state.clone(), session.clone())
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::cookie::{Key, SameSite};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use chrono::FixedOffset;
    use rstest::rstest;

    use herdbook::inbound::http::state::StateDeps;
    use herdbook::outbound::memory::InMemoryFarmStore;
    use herdbook::outbound::notify::LogNotifier;

    use super::*;

    fn memory_state() -> web::Data<HttpState> {
        web::Data::new(HttpState::from_store(
            Arc::new(InMemoryFarmStore::default()),
            StateDeps {
                notifier: Arc::new(LogNotifier),
                clock: Arc::new(mockable::DefaultClock),
                utc_offset: FixedOffset::east_opt(0).expect("utc offset"),
            },
        ))
    }

    fn session() -> SessionSettings {
        SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[rstest]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::SERVICE_UNAVAILABLE)]
    #[case("/api/v1/farms", StatusCode::UNAUTHORIZED)]
    #[case("/api/v1/unknown", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn assembled_app_routes_requests(#[case] uri: &str, #[case] expected: StatusCode) {
        let app = test::init_service(build_app(
            web::Data::new(HealthState::new()),
            memory_state(),
            session(),
        ))
        .await;

        let response = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;

        assert_eq!(response.status(), expected);
        assert!(response.headers().contains_key("trace-id"));
    }
}
