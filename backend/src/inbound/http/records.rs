//! Scoped CRUD endpoints for every plain farm record.
//!
//! ```text
//! GET    /api/v1/farms            list visible farms
//! POST   /api/v1/farms            create (201)
//! GET    /api/v1/farms/{id}       fetch one
//! PUT    /api/v1/farms/{id}       replace client-writable fields
//! DELETE /api/v1/farms/{id}       delete (204)
//! ```
//!
//! The same five routes exist for animals, chicken batches, milk production,
//! milk sales, feeds, chicken feeds, feed consumption, health records and egg
//! production. Out-of-scope ids answer `404`.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::domain::{
    Animal, AnimalDraft, ChickenBatch, ChickenBatchDraft, ChickenFeed, ChickenFeedDraft,
    EggProduction, EggProductionDraft, Error, Farm, FarmDraft, Feed, FeedConsumption,
    FeedConsumptionDraft, FeedDraft, HealthRecord, HealthRecordDraft, MilkProduction,
    MilkProductionDraft, MilkSale, MilkSaleDraft,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::CurrentPrincipal;
use crate::inbound::http::state::HttpState;

macro_rules! record_endpoints {
    (
        $field:ident: $record:ident / $draft:ident,
        one = $one:ident,
        routes = ($route:tt, $item_route:tt),
        docs = ($doc:tt, $item_doc:tt),
        tag = $tag:tt $(,)?
    ) => {
        ::paste::paste! {
            #[utoipa::path(
                get,
                path = $doc,
                responses(
                    (status = 200, description = "Visible records", body = [$record]),
                    (status = 401, description = "Login required", body = Error)
                ),
                tags = [$tag]
            )]
            pub async fn [<list_ $field>](
                state: web::Data<HttpState>,
                principal: CurrentPrincipal,
            ) -> ApiResult<web::Json<Vec<$record>>> {
                Ok(web::Json(state.$field.list(&principal).await?))
            }

            #[utoipa::path(
                get,
                path = $item_doc,
                params(("id" = Uuid, Path, description = "Record id")),
                responses(
                    (status = 200, description = "Record", body = $record),
                    (status = 401, description = "Login required", body = Error),
                    (status = 404, description = "Unknown or out of scope", body = Error)
                ),
                tags = [$tag]
            )]
            pub async fn [<get_ $one>](
                state: web::Data<HttpState>,
                principal: CurrentPrincipal,
                id: web::Path<Uuid>,
            ) -> ApiResult<web::Json<$record>> {
                Ok(web::Json(state.$field.get(&principal, id.into_inner()).await?))
            }

            #[utoipa::path(
                post,
                path = $doc,
                request_body = $draft,
                responses(
                    (status = 201, description = "Created", body = $record),
                    (status = 400, description = "Invalid payload", body = Error),
                    (status = 401, description = "Login required", body = Error),
                    (status = 403, description = "Outside the caller's farm", body = Error),
                    (status = 409, description = "Duplicate record", body = Error)
                ),
                tags = [$tag]
            )]
            pub async fn [<create_ $one>](
                state: web::Data<HttpState>,
                principal: CurrentPrincipal,
                payload: web::Json<$draft>,
            ) -> ApiResult<HttpResponse> {
                let record = state.$field.create(&principal, payload.into_inner()).await?;
                Ok(HttpResponse::Created().json(record))
            }

            #[utoipa::path(
                put,
                path = $item_doc,
                params(("id" = Uuid, Path, description = "Record id")),
                request_body = $draft,
                responses(
                    (status = 200, description = "Replaced", body = $record),
                    (status = 400, description = "Invalid payload", body = Error),
                    (status = 403, description = "Outside the caller's farm", body = Error),
                    (status = 404, description = "Unknown or out of scope", body = Error),
                    (status = 409, description = "Duplicate record", body = Error)
                ),
                tags = [$tag]
            )]
            pub async fn [<replace_ $one>](
                state: web::Data<HttpState>,
                principal: CurrentPrincipal,
                id: web::Path<Uuid>,
                payload: web::Json<$draft>,
            ) -> ApiResult<web::Json<$record>> {
                let record = state
                    .$field
                    .replace(&principal, id.into_inner(), payload.into_inner())
                    .await?;
                Ok(web::Json(record))
            }

            #[utoipa::path(
                delete,
                path = $item_doc,
                params(("id" = Uuid, Path, description = "Record id")),
                responses(
                    (status = 204, description = "Deleted"),
                    (status = 401, description = "Login required", body = Error),
                    (status = 404, description = "Unknown or out of scope", body = Error)
                ),
                tags = [$tag]
            )]
            pub async fn [<delete_ $one>](
                state: web::Data<HttpState>,
                principal: CurrentPrincipal,
                id: web::Path<Uuid>,
            ) -> ApiResult<HttpResponse> {
                state.$field.delete(&principal, id.into_inner()).await?;
                Ok(HttpResponse::NoContent().finish())
            }

            fn [<configure_ $field>](cfg: &mut web::ServiceConfig) {
                cfg.service(
                    web::resource($route)
                        .route(web::get().to([<list_ $field>]))
                        .route(web::post().to([<create_ $one>])),
                )
                .service(
                    web::resource($item_route)
                        .route(web::get().to([<get_ $one>]))
                        .route(web::put().to([<replace_ $one>]))
                        .route(web::delete().to([<delete_ $one>])),
                );
            }

            /// OpenAPI fragment for this resource.
            #[derive(utoipa::OpenApi)]
            #[openapi(
                paths(
                    [<list_ $field>],
                    [<get_ $one>],
                    [<create_ $one>],
                    [<replace_ $one>],
                    [<delete_ $one>]
                ),
                components(schemas($record, $draft))
            )]
            pub struct [<$record Api>];
        }
    };
}

record_endpoints!(
    farms: Farm / FarmDraft,
    one = farm,
    routes = ("/farms", "/farms/{id}"),
    docs = ("/api/v1/farms", "/api/v1/farms/{id}"),
    tag = "farms",
);
record_endpoints!(
    animals: Animal / AnimalDraft,
    one = animal,
    routes = ("/animals", "/animals/{id}"),
    docs = ("/api/v1/animals", "/api/v1/animals/{id}"),
    tag = "livestock",
);
record_endpoints!(
    chicken_batches: ChickenBatch / ChickenBatchDraft,
    one = chicken_batch,
    routes = ("/chicken-batches", "/chicken-batches/{id}"),
    docs = ("/api/v1/chicken-batches", "/api/v1/chicken-batches/{id}"),
    tag = "livestock",
);
record_endpoints!(
    milk_production: MilkProduction / MilkProductionDraft,
    one = milk_record,
    routes = ("/milk-production", "/milk-production/{id}"),
    docs = ("/api/v1/milk-production", "/api/v1/milk-production/{id}"),
    tag = "production",
);
record_endpoints!(
    milk_sales: MilkSale / MilkSaleDraft,
    one = milk_sale,
    routes = ("/milk-sales", "/milk-sales/{id}"),
    docs = ("/api/v1/milk-sales", "/api/v1/milk-sales/{id}"),
    tag = "production",
);
record_endpoints!(
    feeds: Feed / FeedDraft,
    one = feed,
    routes = ("/feeds", "/feeds/{id}"),
    docs = ("/api/v1/feeds", "/api/v1/feeds/{id}"),
    tag = "feed",
);
record_endpoints!(
    chicken_feeds: ChickenFeed / ChickenFeedDraft,
    one = chicken_feed,
    routes = ("/chicken-feeds", "/chicken-feeds/{id}"),
    docs = ("/api/v1/chicken-feeds", "/api/v1/chicken-feeds/{id}"),
    tag = "feed",
);
record_endpoints!(
    feed_consumption: FeedConsumption / FeedConsumptionDraft,
    one = feed_consumption_record,
    routes = ("/feed-consumption", "/feed-consumption/{id}"),
    docs = ("/api/v1/feed-consumption", "/api/v1/feed-consumption/{id}"),
    tag = "feed",
);
record_endpoints!(
    health_records: HealthRecord / HealthRecordDraft,
    one = health_record,
    routes = ("/health-records", "/health-records/{id}"),
    docs = ("/api/v1/health-records", "/api/v1/health-records/{id}"),
    tag = "livestock",
);
record_endpoints!(
    egg_production: EggProduction / EggProductionDraft,
    one = egg_record,
    routes = ("/egg-production", "/egg-production/{id}"),
    docs = ("/api/v1/egg-production", "/api/v1/egg-production/{id}"),
    tag = "production",
);

/// Register every record resource.
pub fn configure(cfg: &mut web::ServiceConfig) {
    configure_farms(cfg);
    configure_animals(cfg);
    configure_chicken_batches(cfg);
    configure_milk_production(cfg);
    configure_milk_sales(cfg);
    configure_feeds(cfg);
    configure_chicken_feeds(cfg);
    configure_feed_consumption(cfg);
    configure_health_records(cfg);
    configure_egg_production(cfg);
}

/// Merge every resource's OpenAPI fragment into `openapi`.
pub fn merge_docs(openapi: &mut utoipa::openapi::OpenApi) {
    use utoipa::OpenApi as _;

    for fragment in [
        FarmApi::openapi(),
        AnimalApi::openapi(),
        ChickenBatchApi::openapi(),
        MilkProductionApi::openapi(),
        MilkSaleApi::openapi(),
        FeedApi::openapi(),
        ChickenFeedApi::openapi(),
        FeedConsumptionApi::openapi(),
        HealthRecordApi::openapi(),
        EggProductionApi::openapi(),
    ] {
        openapi.merge(fragment);
    }
}
