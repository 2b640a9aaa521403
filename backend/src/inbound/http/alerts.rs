//! Restock alert endpoints. Alerts are raised by the feed workflow only.

use actix_web::{get, post, web};
use uuid::Uuid;

use crate::domain::{Error, RestockAlert};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::CurrentPrincipal;
use crate::inbound::http::state::HttpState;

#[utoipa::path(
    get,
    path = "/api/v1/restock-alerts",
    responses(
        (status = 200, description = "Visible alerts, newest first", body = [RestockAlert]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["alerts"]
)]
#[get("/restock-alerts")]
pub async fn list_alerts(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
) -> ApiResult<web::Json<Vec<RestockAlert>>> {
    Ok(web::Json(state.alerts.list(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/restock-alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert", body = RestockAlert),
        (status = 404, description = "Unknown or out of scope", body = Error)
    ),
    tags = ["alerts"]
)]
#[get("/restock-alerts/{id}")]
pub async fn get_alert(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<RestockAlert>> {
    Ok(web::Json(state.alerts.get(&principal, id.into_inner()).await?))
}

/// Mark an alert resolved. Admins only.
#[utoipa::path(
    post,
    path = "/api/v1/restock-alerts/{id}/resolve",
    params(("id" = Uuid, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Resolved alert", body = RestockAlert),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Unknown alert", body = Error)
    ),
    tags = ["alerts"]
)]
#[post("/restock-alerts/{id}/resolve")]
pub async fn resolve_alert(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<RestockAlert>> {
    Ok(web::Json(
        state.alerts.resolve(&principal, id.into_inner()).await?,
    ))
}
