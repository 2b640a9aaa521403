//! Cookie session wrapper.
//!
//! Handlers never touch `actix_session` directly; they persist, read or purge
//! the logged-in user id through [`SessionContext`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Session operations available to handlers.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user's id, rotating the session id.
    pub fn persist_user(&self, user_id: UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// User id stored in the session. Tampered values read as absent.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::parse(&raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Stored user id, or `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session entry and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn set(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = UserId::parse(FIXTURE_ID).map_err(|e| Error::internal(e.to_string()))?;
        session.persist_user(id)?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn get(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn clear(session: SessionContext) -> HttpResponse {
        session.purge();
        HttpResponse::Ok().finish()
    }

    async fn tamper(session: Session) -> Result<HttpResponse, Error> {
        session
            .insert(USER_ID_KEY, "not-a-uuid")
            .map_err(|e| Error::internal(e.to_string()))?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn call(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        uri: &str,
        cookie: Option<Cookie<'static>>,
    ) -> actix_web::dev::ServiceResponse {
        let mut request = test::TestRequest::get().uri(uri);
        if let Some(cookie) = cookie {
            request = request.cookie(cookie);
        }
        test::call_service(app, request.to_request()).await
    }

    #[actix_web::test]
    async fn stores_and_reads_user_id() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/set", web::get().to(set))
                .route("/get", web::get().to(get)),
        )
        .await;
        let cookie = session_cookie(&call(&app, "/set", None).await);
        let res = call(&app, "/get", Some(cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, FIXTURE_ID);
    }

    #[actix_web::test]
    async fn missing_or_tampered_ids_are_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/tamper", web::get().to(tamper))
                .route("/get", web::get().to(get)),
        )
        .await;
        assert_eq!(call(&app, "/get", None).await.status(), StatusCode::UNAUTHORIZED);
        let cookie = session_cookie(&call(&app, "/tamper", None).await);
        let res = call(&app, "/get", Some(cookie)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn purge_expires_the_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/set", web::get().to(set))
                .route("/clear", web::get().to(clear)),
        )
        .await;
        let cookie = session_cookie(&call(&app, "/set", None).await);
        let res = call(&app, "/clear", Some(cookie)).await;
        let removal = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("removal cookie");
        assert_eq!(removal.value(), "");
    }
}
