//! Lifecycle endpoints on animals and chicken batches.
//!
//! ```text
//! POST /api/v1/animals/{id}/add_calf                 {"name":"Clover","birth_date":"2024-05-30"}
//! POST /api/v1/chicken-batches/{id}/update_mortality {"deaths":3}
//! POST /api/v1/chicken-batches/{id}/add_hatched      {"hatched":12}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Animal, CalfDraft, ChickenBatch, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::CurrentPrincipal;
use crate::inbound::http::state::HttpState;

/// Birds lost from a batch. Missing means zero.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MortalityRequest {
    #[serde(default)]
    pub deaths: i64,
}

/// Birds hatched into a batch. Missing means zero.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct HatchRequest {
    #[serde(default)]
    pub hatched: i64,
}

/// Head count after an adjustment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BatchCountResponse {
    pub current_count: u32,
}

impl From<ChickenBatch> for BatchCountResponse {
    fn from(batch: ChickenBatch) -> Self {
        Self {
            current_count: batch.current_count,
        }
    }
}

/// Register a calf under a visible mother; the calf joins her farm.
#[utoipa::path(
    post,
    path = "/api/v1/animals/{id}/add_calf",
    params(("id" = Uuid, Path, description = "Mother id")),
    request_body = CalfDraft,
    responses(
        (status = 200, description = "Calf created", body = Animal),
        (status = 400, description = "Invalid calf", body = Error),
        (status = 404, description = "Mother unknown or out of scope", body = Error)
    ),
    tags = ["livestock"]
)]
#[post("/animals/{id}/add_calf")]
pub async fn add_calf(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    id: web::Path<Uuid>,
    payload: web::Json<CalfDraft>,
) -> ApiResult<web::Json<Animal>> {
    let calf = state
        .lifecycle
        .add_calf(&principal, id.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(calf))
}

#[utoipa::path(
    post,
    path = "/api/v1/chicken-batches/{id}/update_mortality",
    params(("id" = Uuid, Path, description = "Batch id")),
    request_body = MortalityRequest,
    responses(
        (status = 200, description = "Updated head count", body = BatchCountResponse),
        (status = 400, description = "Negative count", body = Error),
        (status = 404, description = "Batch unknown or out of scope", body = Error)
    ),
    tags = ["livestock"]
)]
#[post("/chicken-batches/{id}/update_mortality")]
pub async fn update_mortality(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    id: web::Path<Uuid>,
    payload: web::Json<MortalityRequest>,
) -> ApiResult<web::Json<BatchCountResponse>> {
    let batch = state
        .lifecycle
        .update_mortality(&principal, id.into_inner(), payload.deaths)
        .await?;
    Ok(web::Json(batch.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/chicken-batches/{id}/add_hatched",
    params(("id" = Uuid, Path, description = "Batch id")),
    request_body = HatchRequest,
    responses(
        (status = 200, description = "Updated head count", body = BatchCountResponse),
        (status = 400, description = "Negative count or overflow", body = Error),
        (status = 404, description = "Batch unknown or out of scope", body = Error)
    ),
    tags = ["livestock"]
)]
#[post("/chicken-batches/{id}/add_hatched")]
pub async fn add_hatched(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    id: web::Path<Uuid>,
    payload: web::Json<HatchRequest>,
) -> ApiResult<web::Json<BatchCountResponse>> {
    let batch = state
        .lifecycle
        .add_hatched(&principal, id.into_inner(), payload.hatched)
        .await?;
    Ok(web::Json(batch.into()))
}
