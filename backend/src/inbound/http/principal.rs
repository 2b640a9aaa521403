//! Authenticated principal extractor.
//!
//! Resolves the session's user id to a [`Principal`] on every request, so a
//! role change or an assignment to another farm takes effect immediately.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Principal};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// The logged-in caller. Rejects with `401` when there is no valid session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentPrincipal(pub Principal);

impl std::ops::Deref for CurrentPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentPrincipal {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let user_id = session.await.map_err(Error::from)?.require_user_id()?;
            let principal = state.accounts.principal(user_id).await?;
            Ok(Self(principal))
        })
    }
}
