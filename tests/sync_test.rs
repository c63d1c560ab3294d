//! Offline bulk-sync tests: per-sale failure isolation, idempotent batch
//! retries, and the sync log record.

mod common;

use axum::http::{Method, StatusCode};
use common::{seed_fixtures, stock_of, TestApp};
use restaurant_os_api::auth::Role;
use restaurant_os_api::entities::sync_log;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::json;

#[tokio::test]
async fn batch_isolates_per_sale_failures() {
    // Three sales; the second references an unknown menu item. The other
    // two commit with their deductions.
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Staff, vec![fx.branch_id]);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/pos/sync",
            &token,
            Some(json!({
                "sales": [
                    {
                        "branch_id": fx.branch_id,
                        "payment_method": "cash",
                        "offline_id": "batch-1",
                        "items": [{"menu_item_id": fx.tikka_id, "quantity": 1}],
                    },
                    {
                        "branch_id": fx.branch_id,
                        "payment_method": "cash",
                        "offline_id": "batch-2",
                        "items": [{"menu_item_id": uuid::Uuid::new_v4(), "quantity": 1}],
                    },
                    {
                        "branch_id": fx.branch_id,
                        "payment_method": "card",
                        "offline_id": "batch-3",
                        "items": [{"menu_item_id": fx.rice_dish_id, "quantity": 2}],
                    },
                ],
            })),
        )
        .await;

    // Partial success is not an HTTP error.
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["synced"], 2);
    assert_eq!(body["failed"], 1);

    let successful = body["results"]["successful"].as_array().unwrap();
    assert_eq!(successful.len(), 2);
    let failed = body["results"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["offline_id"], "batch-2");

    // Deductions happened for exactly the committed sales.
    assert_eq!(stock_of(&app, fx.chicken_stock_id).await, dec!(1.5));
    assert_eq!(stock_of(&app, fx.rice_stock_id).await, dec!(9.6));
}

#[tokio::test]
async fn retried_batch_replays_idempotently() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Staff, vec![fx.branch_id]);

    let batch = json!({
        "sales": [
            {
                "branch_id": fx.branch_id,
                "payment_method": "cash",
                "offline_id": "retry-1",
                "items": [{"menu_item_id": fx.tikka_id, "quantity": 2}],
            },
        ],
    });

    let (status, first) = app
        .request(Method::POST, "/api/v1/pos/sync", &token, Some(batch.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["synced"], 1);
    assert_eq!(stock_of(&app, fx.chicken_stock_id).await, dec!(1.0));

    // The client lost the response and retries the whole batch.
    let (status, second) = app
        .request(Method::POST, "/api/v1/pos/sync", &token, Some(batch))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["synced"], 1);
    assert_eq!(second["failed"], 0);
    let replay = &second["results"]["successful"][0];
    assert_eq!(replay["replayed"], true);
    assert_eq!(
        replay["sale_id"],
        first["results"]["successful"][0]["sale_id"]
    );

    // Stock moved once, not twice.
    assert_eq!(stock_of(&app, fx.chicken_stock_id).await, dec!(1.0));
}

#[tokio::test]
async fn sales_without_offline_ids_are_rejected_within_the_batch() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Staff, vec![fx.branch_id]);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/pos/sync",
            &token,
            Some(json!({
                "sales": [
                    {
                        "branch_id": fx.branch_id,
                        "payment_method": "cash",
                        "items": [{"menu_item_id": fx.lemonade_id, "quantity": 1}],
                    },
                ],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["synced"], 0);
    assert_eq!(body["failed"], 1);
}

#[tokio::test]
async fn each_batch_writes_a_sync_log_row() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Staff, vec![fx.branch_id]);

    app.request(
        Method::POST,
        "/api/v1/pos/sync",
        &token,
        Some(json!({
            "sales": [
                {
                    "branch_id": fx.branch_id,
                    "payment_method": "cash",
                    "offline_id": "log-1",
                    "items": [{"menu_item_id": fx.lemonade_id, "quantity": 1}],
                },
                {
                    "branch_id": fx.branch_id,
                    "payment_method": "cash",
                    "offline_id": "log-2",
                    "items": [{"menu_item_id": uuid::Uuid::new_v4(), "quantity": 1}],
                },
            ],
        })),
    )
    .await;

    let logs = sync_log::Entity::find().all(&*app.state.db).await.unwrap();
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.sales_synced, 1);
    assert_eq!(log.sales_failed, 1);
    assert_eq!(log.event_type, "sync_failure");
    assert_eq!(log.branch_id, Some(fx.branch_id));
    assert!(log.details.contains("log-2"));
}
