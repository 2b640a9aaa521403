//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use chrono::FixedOffset;
use mockable::DefaultClock;

use crate::inbound::http::state::{HttpState, StateDeps};
use crate::outbound::memory::InMemoryFarmStore;
use crate::outbound::notify::LogNotifier;

/// Session middleware with a fresh key and non-secure cookies.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `response`.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Handler state over an empty in-memory store.
pub fn memory_state() -> HttpState {
    HttpState::from_store(
        Arc::new(InMemoryFarmStore::default()),
        StateDeps {
            notifier: Arc::new(LogNotifier),
            clock: Arc::new(DefaultClock),
            utc_offset: FixedOffset::east_opt(0).expect("utc offset"),
        },
    )
}
