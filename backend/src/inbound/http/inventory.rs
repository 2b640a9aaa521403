//! Feed depletion endpoint.
//!
//! ```text
//! POST /api/v1/feed/mark-complete {"feed_id":"…","feed_kind":"chicken_feed"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, FeedCompletion, FeedKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::CurrentPrincipal;
use crate::inbound::http::state::HttpState;

/// Feed to mark finished. `feed_kind` (alias `feed_type`) defaults to
/// `cow_feed`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MarkCompleteRequest {
    pub feed_id: Uuid,
    #[serde(default, alias = "feed_type")]
    pub feed_kind: FeedKind,
}

/// Mark a feed finished and raise (or reuse) its restock alert.
#[utoipa::path(
    post,
    path = "/api/v1/feed/mark-complete",
    request_body = MarkCompleteRequest,
    responses(
        (status = 200, description = "Feed finished", body = FeedCompletion),
        (status = 400, description = "Malformed request", body = Error),
        (status = 404, description = "Feed unknown or out of scope", body = Error)
    ),
    tags = ["feed"]
)]
#[post("/feed/mark-complete")]
pub async fn mark_complete(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    payload: web::Json<MarkCompleteRequest>,
) -> ApiResult<web::Json<FeedCompletion>> {
    let MarkCompleteRequest { feed_id, feed_kind } = payload.into_inner();
    let completion = state
        .inventory
        .mark_complete(&principal, feed_id, feed_kind)
        .await?;
    Ok(web::Json(completion))
}
