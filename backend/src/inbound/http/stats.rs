//! Production statistics endpoints.
//!
//! ```text
//! GET /api/v1/stats/milk/{farm_id}?period=weekly&as_of=2024-03-15
//! GET /api/v1/stats/eggs/{farm_id}?period=monthly
//! ```

use actix_web::{get, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::{Error, Metric, Period, ProductionTotals};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::CurrentPrincipal;
use crate::inbound::http::state::HttpState;

/// Window selection. `period` defaults to `daily`, `as_of` to today.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// One of `daily`, `weekly`, `monthly`, `yearly`.
    pub period: Option<String>,
    /// Last day of the window (`YYYY-MM-DD`).
    #[param(value_type = Option<String>, format = Date)]
    pub as_of: Option<NaiveDate>,
}

impl StatsQuery {
    fn period(&self) -> Result<Period, Error> {
        match self.period.as_deref() {
            None => Ok(Period::default()),
            Some(raw) => Ok(raw.parse::<Period>()?),
        }
    }
}

async fn totals(
    state: &HttpState,
    principal: &CurrentPrincipal,
    metric: Metric,
    farm_id: Uuid,
    query: &StatsQuery,
) -> ApiResult<web::Json<ProductionTotals>> {
    let period = query.period()?;
    let totals = state
        .stats
        .aggregate(principal, metric, farm_id, period, query.as_of)
        .await?;
    Ok(web::Json(totals))
}

/// Litres of milk recorded for a farm's animals in the window.
#[utoipa::path(
    get,
    path = "/api/v1/stats/milk/{farm_id}",
    params(("farm_id" = Uuid, Path, description = "Farm id"), StatsQuery),
    responses(
        (status = 200, description = "Milk totals", body = ProductionTotals),
        (status = 400, description = "Unknown period or bad date", body = Error),
        (status = 404, description = "Farm unknown or out of scope", body = Error)
    ),
    tags = ["stats"]
)]
#[get("/stats/milk/{farm_id}")]
pub async fn milk_stats(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    farm_id: web::Path<Uuid>,
    query: web::Query<StatsQuery>,
) -> ApiResult<web::Json<ProductionTotals>> {
    totals(&state, &principal, Metric::Milk, farm_id.into_inner(), &query).await
}

/// Eggs collected by a farm's batches in the window.
#[utoipa::path(
    get,
    path = "/api/v1/stats/eggs/{farm_id}",
    params(("farm_id" = Uuid, Path, description = "Farm id"), StatsQuery),
    responses(
        (status = 200, description = "Egg totals", body = ProductionTotals),
        (status = 400, description = "Unknown period or bad date", body = Error),
        (status = 404, description = "Farm unknown or out of scope", body = Error)
    ),
    tags = ["stats"]
)]
#[get("/stats/eggs/{farm_id}")]
pub async fn egg_stats(
    state: web::Data<HttpState>,
    principal: CurrentPrincipal,
    farm_id: web::Path<Uuid>,
    query: web::Query<StatsQuery>,
) -> ApiResult<web::Json<ProductionTotals>> {
    totals(&state, &principal, Metric::Eggs, farm_id.into_inner(), &query).await
}
