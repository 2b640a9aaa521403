//! In-process API harness over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{FixedOffset, Utc};
use serde_json::{Value, json};

use herdbook::Trace;
use herdbook::domain::ports::AccountRepository;
use herdbook::domain::{Account, PasswordDigest, Role, UserId};
use herdbook::inbound::http::configure;
use herdbook::inbound::http::state::{HttpState, StateDeps};
use herdbook::outbound::memory::InMemoryFarmStore;
use herdbook::outbound::notify::LogNotifier;

pub const ADMIN: (&str, &str) = ("admin", "admin-pass-1");

/// Store plus handler state sharing it.
pub struct Harness {
    pub store: Arc<InMemoryFarmStore>,
    pub state: HttpState,
}

impl Harness {
    /// Empty store with one admin account.
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryFarmStore::default());
        let state = HttpState::from_store(
            store.clone(),
            StateDeps {
                notifier: Arc::new(LogNotifier),
                clock: Arc::new(mockable::DefaultClock),
                utc_offset: FixedOffset::east_opt(0).expect("utc offset"),
            },
        );
        let created = state
            .accounts
            .ensure_admin(ADMIN.0, "admin@example.com", ADMIN.1)
            .await
            .expect("bootstrap admin");
        assert!(created);
        Self { store, state }
    }

    /// Store a farmer bound to `farm_id` with a known password.
    pub async fn add_farmer(&self, username: &str, password: &str, farm_id: &str) -> Account {
        let account = Account {
            id: UserId::random(),
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Farmer,
            assigned_farm: Some(farm_id.parse().expect("farm id")),
            phone: String::new(),
            created_at: Utc::now(),
        };
        AccountRepository::insert(
            self.store.as_ref(),
            &account,
            &PasswordDigest::derive(password),
        )
        .await
        .expect("insert farmer");
        account
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        test::init_service(
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .wrap(Trace)
                .service(
                    web::scope("/api/v1")
                        .wrap(
                            SessionMiddleware::builder(
                                CookieSessionStore::default(),
                                Key::generate(),
                            )
                            .cookie_name("session".to_owned())
                            .cookie_secure(false)
                            .build(),
                        )
                        .configure(configure),
                ),
        )
        .await
    }
}

/// Log in and return the session cookie.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(
        app,
        TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login as {username}");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// Send `request` and decode the JSON body, if any.
pub async fn send<S, B>(app: &S, request: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub fn get(uri: &str, cookie: &Cookie<'static>) -> TestRequest {
    TestRequest::get().uri(uri).cookie(cookie.clone())
}

pub fn post(uri: &str, cookie: &Cookie<'static>, body: Value) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
}

pub fn put(uri: &str, cookie: &Cookie<'static>, body: Value) -> TestRequest {
    TestRequest::put()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
}

pub fn delete(uri: &str, cookie: &Cookie<'static>) -> TestRequest {
    TestRequest::delete().uri(uri).cookie(cookie.clone())
}

/// `id` of a created record.
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("record id").to_owned()
}

/// Create a record as `cookie` and return its body.
pub async fn create<S, B>(app: &S, cookie: &Cookie<'static>, uri: &str, payload: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(app, post(uri, cookie, payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create {uri}: {body}");
    body
}

pub fn farm_payload(name: &str) -> Value {
    json!({ "name": name, "location": "Nakuru" })
}

pub fn cow_payload(farm_id: &str, name: &str) -> Value {
    json!({
        "farm_id": farm_id,
        "name": name,
        "stage": "lactating",
        "birth_date": "2020-02-01"
    })
}

pub fn batch_payload(farm_id: &str, number: u32, count: u32) -> Value {
    json!({
        "farm_id": farm_id,
        "batch_name": format!("Batch {number}"),
        "batch_number": number,
        "initial_count": count,
        "purchase_date": "2024-01-10"
    })
}

pub fn feed_payload(farm_id: &str) -> Value {
    json!({
        "farm_id": farm_id,
        "feed_type": "dairy_meal",
        "quantity_purchased": "100.00",
        "quantity_remaining": "20.00",
        "unit_price": "45.00",
        "purchase_date": "2024-03-01"
    })
}
