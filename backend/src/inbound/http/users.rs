//! Login, logout, user listing and farmer invitations.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"password"}
//! POST /api/v1/logout
//! GET /api/v1/users
//! POST /api/v1/invite-farmer {"email":"new@example.com","farm_id":"…"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Account, Error, FarmerInvite, LoginCredentials, LoginOutcome, LoginValidationError, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::CurrentPrincipal;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Authenticate and establish a session.
///
/// The body names the account and where the client should land next.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginOutcome,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginOutcome>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let outcome = state.accounts.login(&credentials).await?;
    session.persist_user(outcome.account.id)?;
    Ok(web::Json(outcome))
}

/// End the session. Succeeds whether or not anyone was logged in.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().finish()
}

/// Accounts visible to the caller. Farmers only see themselves.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [Account]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
) -> ApiResult<web::Json<Vec<Account>>> {
    Ok(web::Json(state.accounts.list(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = Account),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown or out of scope", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    id: web::Path<String>,
) -> ApiResult<web::Json<Account>> {
    let user_id = UserId::parse(&id).map_err(|err| {
        Error::invalid_request(format!("invalid user id: {err}"))
            .with_details(json!({ "field": "id", "code": "malformed" }))
    })?;
    Ok(web::Json(state.accounts.get(&principal, user_id).await?))
}

/// Create a farmer bound to a farm and mail them their credentials.
#[utoipa::path(
    post,
    path = "/api/v1/invite-farmer",
    request_body = FarmerInvite,
    responses(
        (status = 201, description = "Farmer invited", body = Account),
        (status = 400, description = "Invalid invitation", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 409, description = "Username taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "inviteFarmer"
)]
#[post("/invite-farmer")]
pub async fn invite_farmer(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    payload: web::Json<FarmerInvite>,
) -> ApiResult<HttpResponse> {
    let account = state
        .accounts
        .invite(&principal, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(account))
}
