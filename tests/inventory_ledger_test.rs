//! Stock ledger tests: audit rows for every mutation, non-negative stock
//! under contention, and role gating on manual corrections.

mod common;

use axum::http::{Method, StatusCode};
use common::{insert_stock, seed_fixtures, stock_of, TestApp};
use restaurant_os_api::auth::{AccessScope, Role};
use restaurant_os_api::entities::inventory_transaction::{self, TransactionType};
use restaurant_os_api::services::ledger::{self, LedgerContext};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

fn manager_scope() -> AccessScope {
    AccessScope {
        user_id: Uuid::new_v4(),
        role: Role::Manager,
        branches: vec![],
    }
}

#[tokio::test]
async fn restock_adds_stock_and_appends_an_audit_row() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Manager, vec![fx.branch_id]);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/{}/restock", fx.chicken_stock_id),
            &token,
            Some(json!({"quantity": "5.0", "notes": "weekly delivery"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(
        Decimal::from_str(body["previous_quantity"].as_str().unwrap()).unwrap(),
        dec!(2.0)
    );
    assert_eq!(
        Decimal::from_str(body["new_quantity"].as_str().unwrap()).unwrap(),
        dec!(7.0)
    );

    let rows = inventory_transaction::Entity::find()
        .filter(inventory_transaction::Column::InventoryItemId.eq(fx.chicken_stock_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].r#type, "restock");
    assert_eq!(rows[0].previous_quantity, dec!(2.0));
    assert_eq!(rows[0].new_quantity, dec!(7.0));
    assert_eq!(rows[0].notes.as_deref(), Some("weekly delivery"));

    let item = restaurant_os_api::entities::inventory_item::Entity::find_by_id(fx.chicken_stock_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert!(item.last_restocked_at.is_some());
}

#[tokio::test]
async fn waste_adjustment_cannot_push_stock_negative() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Manager, vec![fx.branch_id]);

    // 2 kg on hand; writing off 3 kg must fail and leave no audit row.
    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/{}/adjust", fx.chicken_stock_id),
            &token,
            Some(json!({
                "quantity": "-3.0",
                "transaction_type": "waste",
                "notes": "spoiled batch",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(&app, fx.chicken_stock_id).await, dec!(2.0));

    let rows = inventory_transaction::Entity::find()
        .filter(inventory_transaction::Column::InventoryItemId.eq(fx.chicken_stock_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert!(rows.is_empty());

    // A write-off that fits goes through.
    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/{}/adjust", fx.chicken_stock_id),
            &token,
            Some(json!({
                "quantity": "-0.5",
                "transaction_type": "waste",
                "notes": "spoiled batch",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock_of(&app, fx.chicken_stock_id).await, dec!(1.5));
}

#[tokio::test]
async fn staff_cannot_adjust_stock() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Staff, vec![fx.branch_id]);

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/{}/restock", fx.chicken_stock_id),
            &token,
            Some(json!({"quantity": "5.0"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ledger_rejects_non_positive_quantities() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let scope = manager_scope();
    let ctx = LedgerContext::manual(TransactionType::Adjustment, scope.user_id, None);

    let err = ledger::deduct(&*app.state.db, fx.chicken_stock_id, dec!(0), &ctx)
        .await
        .unwrap_err();
    assert_matches::assert_matches!(
        err,
        restaurant_os_api::errors::ServiceError::InvalidQuantity(_)
    );

    let err = ledger::add(&*app.state.db, fx.chicken_stock_id, dec!(-1), &ctx)
        .await
        .unwrap_err();
    assert_matches::assert_matches!(
        err,
        restaurant_os_api::errors::ServiceError::InvalidQuantity(_)
    );
}

#[tokio::test]
async fn concurrent_deductions_never_go_negative() {
    // Eight tasks race to take 0.3 out of 1.0; at most three can win and
    // the balance must never dip below zero.
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let item_id = insert_stock(&app, fx.restaurant_id, "Saffron", dec!(1.0), "g").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = app.state.db.clone();
        handles.push(tokio::spawn(async move {
            let ctx = LedgerContext::manual(
                TransactionType::Adjustment,
                Uuid::new_v4(),
                Some("contention test".into()),
            );
            ledger::deduct(&*db, item_id, dec!(0.3), &ctx).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    let remaining = stock_of(&app, item_id).await;
    assert!(remaining >= Decimal::ZERO, "stock went negative: {remaining}");
    assert_eq!(successes, 3);
    assert_eq!(remaining, dec!(1.0) - dec!(0.3) * Decimal::from(successes));

    // One audit row per successful deduction.
    let rows = inventory_transaction::Entity::find()
        .filter(inventory_transaction::Column::InventoryItemId.eq(item_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), successes as usize);
}

#[tokio::test]
async fn audit_trail_is_readable_newest_first() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Manager, vec![fx.branch_id]);

    app.request(
        Method::POST,
        &format!("/api/v1/inventory/{}/restock", fx.chicken_stock_id),
        &token,
        Some(json!({"quantity": "1.0"})),
    )
    .await;
    app.request(
        Method::POST,
        &format!("/api/v1/inventory/{}/adjust", fx.chicken_stock_id),
        &token,
        Some(json!({"quantity": "-0.25", "transaction_type": "waste"})),
    )
    .await;

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/inventory/{}/transactions", fx.chicken_stock_id),
            &token,
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["type"], "waste");
    assert_eq!(rows[1]["type"], "restock");
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn low_stock_lists_items_at_or_below_reorder_level() {
    let app = TestApp::new().await;
    let fx = seed_fixtures(&app).await;
    let token = app.token(Role::Staff, vec![fx.branch_id]);

    // Garnish is seeded at zero against a 0.5 reorder level.
    let (status, body) = app
        .request(Method::GET, "/api/v1/inventory/low-stock", &token, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Mint Garnish"));
    assert!(!names.contains(&"Rice"));
}
