//! Feed depletion and the restock alert lifecycle.

#[path = "support/farm_app.rs"]
mod farm_app;

use actix_web::http::StatusCode;
use farm_app::{ADMIN, Harness, create, farm_payload, feed_payload, get, id_of, login, post, send};
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

fn mark_complete(feed_id: &str) -> serde_json::Value {
    json!({ "feed_id": feed_id, "feed_kind": "cow_feed" })
}

#[rstest]
#[actix_web::test]
async fn finished_feed_raises_one_alert_until_resolved() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let admin = login(&app, ADMIN.0, ADMIN.1).await;
    let farm = id_of(&create(&app, &admin, "/api/v1/farms", farm_payload("Green Acres")).await);
    let feed = id_of(&create(&app, &admin, "/api/v1/feeds", feed_payload(&farm)).await);
    harness.add_farmer("njeri", "farmer-pass-1", &farm).await;
    let farmer = login(&app, "njeri", "farmer-pass-1").await;

    let (status, first) = send(
        &app,
        post("/api/v1/feed/mark-complete", &farmer, mark_complete(&feed)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert_eq!(first["alert_created"], true);
    assert_eq!(first["feed"]["is_finished"], true);
    assert_eq!(first["feed"]["needs_restock"], true);
    assert_eq!(first["alert"]["alert_type"], "cow_feed");
    assert_eq!(first["alert"]["farm_id"], farm.as_str());
    let alert_id = id_of(&first["alert"]);

    let (_, again) = send(
        &app,
        post("/api/v1/feed/mark-complete", &farmer, mark_complete(&feed)),
    )
    .await;
    assert_eq!(again["alert_created"], false);
    assert_eq!(again["alert"]["id"], alert_id.as_str());

    let resolve = format!("/api/v1/restock-alerts/{alert_id}/resolve");
    let (status, _) = send(&app, post(&resolve, &farmer, json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, resolved) = send(&app, post(&resolve, &admin, json!({}))).await;
    assert_eq!(status, StatusCode::OK, "{resolved}");
    assert_eq!(resolved["is_resolved"], true);

    let (_, after) = send(
        &app,
        post("/api/v1/feed/mark-complete", &farmer, mark_complete(&feed)),
    )
    .await;
    assert_eq!(after["alert_created"], true);
    assert_ne!(after["alert"]["id"], alert_id.as_str());

    let (_, alerts) = send(&app, get("/api/v1/restock-alerts", &admin)).await;
    assert_eq!(alerts.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[actix_web::test]
async fn farmers_only_see_alerts_for_their_farm() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let admin = login(&app, ADMIN.0, ADMIN.1).await;
    let home = id_of(&create(&app, &admin, "/api/v1/farms", farm_payload("Home")).await);
    let other = id_of(&create(&app, &admin, "/api/v1/farms", farm_payload("Other")).await);
    for farm in [&home, &other] {
        let feed = id_of(&create(&app, &admin, "/api/v1/feeds", feed_payload(farm)).await);
        let (status, _) = send(
            &app,
            post("/api/v1/feed/mark-complete", &admin, mark_complete(&feed)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    harness.add_farmer("mutua", "farmer-pass-2", &home).await;
    let farmer = login(&app, "mutua", "farmer-pass-2").await;

    let (_, visible) = send(&app, get("/api/v1/restock-alerts", &farmer)).await;
    let visible = visible.as_array().expect("alert list");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["farm_id"], home.as_str());

    let (_, all) = send(&app, get("/api/v1/restock-alerts", &admin)).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[actix_web::test]
async fn unknown_feed_is_not_found() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let admin = login(&app, ADMIN.0, ADMIN.1).await;

    let (status, body) = send(
        &app,
        post(
            "/api/v1/feed/mark-complete",
            &admin,
            mark_complete(&Uuid::new_v4().to_string()),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn chicken_feed_alerts_use_the_feed_name() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let admin = login(&app, ADMIN.0, ADMIN.1).await;
    let farm = id_of(&create(&app, &admin, "/api/v1/farms", farm_payload("Coop")).await);
    let feed = id_of(
        &create(
            &app,
            &admin,
            "/api/v1/chicken-feeds",
            json!({
                "farm_id": farm,
                "feed_name": "Layers Mash",
                "quantity_purchased": "50.00",
                "quantity_remaining": "0.00",
                "cost": "60.00",
                "purchase_date": "2024-03-01"
            }),
        )
        .await,
    );

    let (status, body) = send(
        &app,
        post(
            "/api/v1/feed/mark-complete",
            &admin,
            json!({ "feed_id": feed, "feed_type": "chicken_feed" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["alert"]["alert_type"], "chicken_feed");
    assert_eq!(body["alert"]["item_name"], "Layers Mash");
}
