//! Resolved inputs for building the HTTP server.

use std::net::SocketAddr;

use actix_web::web;

use herdbook::inbound::http::session_config::SessionSettings;
use herdbook::inbound::http::state::HttpState;

/// Everything the server factory clones into each worker.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: web::Data<HttpState>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            session,
            bind_addr,
            http_state: web::Data::new(http_state),
        }
    }
}
