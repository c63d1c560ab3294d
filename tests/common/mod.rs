use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use restaurant_os_api::{
    auth::{AuthKeys, Role},
    config::AppConfig,
    db,
    entities::{
        branch, inventory_item, menu_item, recipe, recipe_ingredient, restaurant,
    },
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Test harness: the full application state over an in-memory SQLite
/// database, with helpers for minting tokens and driving the router.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub auth_keys: Arc<AuthKeys>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        // A single connection keeps the in-memory schema alive and shared.
        let pool = db::establish_connection_with_config(&db::DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_keys = Arc::new(AuthKeys::new(&cfg.jwt_secret, cfg.jwt_expiration));
        let services = AppServices::new(db_arc.clone(), event_sender.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth_keys: auth_keys.clone(),
            services,
        };

        let router = Router::new()
            .nest(
                "/api/v1",
                restaurant_os_api::api_v1_routes(auth_keys.clone()),
            )
            .with_state(state.clone());

        Self {
            router,
            state,
            auth_keys,
            _event_task: event_task,
        }
    }

    pub fn token(&self, role: Role, branches: Vec<Uuid>) -> String {
        self.auth_keys.mint(Uuid::new_v4(), role, branches)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"));
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the transport level");

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

/// Seeded catalog shared by the POS tests.
pub struct Fixtures {
    pub restaurant_id: Uuid,
    pub branch_id: Uuid,
    pub other_branch_id: Uuid,
    /// "Chicken Tikka": 0.5 kg chicken per serving plus an optional garnish
    pub tikka_id: Uuid,
    /// "Plain Rice": 0.2 kg rice per serving
    pub rice_dish_id: Uuid,
    /// "Mint Lemonade": no recipe, unconstrained
    pub lemonade_id: Uuid,
    /// Discontinued item; never sellable
    pub retired_id: Uuid,
    pub chicken_stock_id: Uuid,
    pub rice_stock_id: Uuid,
    pub garnish_stock_id: Uuid,
}

/// Seeds one restaurant (17% tax) with two branches, stock and a small menu.
/// Chicken starts at 2 kg so four Tikka servings fit exactly.
pub async fn seed_fixtures(app: &TestApp) -> Fixtures {
    let db = &*app.state.db;
    let now = Utc::now();

    let restaurant_id = Uuid::new_v4();
    restaurant::ActiveModel {
        id: Set(restaurant_id),
        name: Set("Karachi Grill".into()),
        location: Set(Some("Karachi".into())),
        tax_rate: Set(dec!(17.00)),
        created_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();

    let branch_id = Uuid::new_v4();
    branch::ActiveModel {
        id: Set(branch_id),
        restaurant_id: Set(restaurant_id),
        name: Set("Clifton".into()),
        city: Set("Karachi".into()),
        address: Set("Main Clifton Road".into()),
        phone: Set(None),
        is_active: Set(true),
        created_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();

    let other_branch_id = Uuid::new_v4();
    branch::ActiveModel {
        id: Set(other_branch_id),
        restaurant_id: Set(restaurant_id),
        name: Set("DHA".into()),
        city: Set("Karachi".into()),
        address: Set("Phase 5".into()),
        phone: Set(None),
        is_active: Set(true),
        created_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();

    let chicken_stock_id = insert_stock(app, restaurant_id, "Chicken", dec!(2.0), "kg").await;
    let rice_stock_id = insert_stock(app, restaurant_id, "Rice", dec!(10.0), "kg").await;
    let garnish_stock_id = insert_stock(app, restaurant_id, "Mint Garnish", dec!(0), "bunch").await;

    let tikka_id = insert_menu_item(app, restaurant_id, "Chicken Tikka", dec!(450.00), "available").await;
    let rice_dish_id = insert_menu_item(app, restaurant_id, "Plain Rice", dec!(150.00), "available").await;
    let lemonade_id =
        insert_menu_item(app, restaurant_id, "Mint Lemonade", dec!(120.00), "available").await;
    let retired_id =
        insert_menu_item(app, restaurant_id, "Old Special", dec!(300.00), "discontinued").await;

    let tikka_recipe = insert_recipe(app, tikka_id, true).await;
    insert_ingredient(app, tikka_recipe, chicken_stock_id, dec!(0.5), "kg", false).await;
    insert_ingredient(app, tikka_recipe, garnish_stock_id, dec!(1), "bunch", true).await;

    let rice_recipe = insert_recipe(app, rice_dish_id, true).await;
    insert_ingredient(app, rice_recipe, rice_stock_id, dec!(0.2), "kg", false).await;

    Fixtures {
        restaurant_id,
        branch_id,
        other_branch_id,
        tikka_id,
        rice_dish_id,
        lemonade_id,
        retired_id,
        chicken_stock_id,
        rice_stock_id,
        garnish_stock_id,
    }
}

pub async fn insert_stock(
    app: &TestApp,
    restaurant_id: Uuid,
    name: &str,
    quantity: Decimal,
    unit: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    inventory_item::ActiveModel {
        id: Set(id),
        restaurant_id: Set(restaurant_id),
        name: Set(name.into()),
        quantity_in_stock: Set(quantity),
        unit: Set(unit.into()),
        reorder_level: Set(dec!(0.5)),
        reorder_quantity: Set(dec!(10)),
        unit_cost: Set(None),
        last_restocked_at: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
    id
}

pub async fn insert_menu_item(
    app: &TestApp,
    restaurant_id: Uuid,
    name: &str,
    price: Decimal,
    status: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    menu_item::ActiveModel {
        id: Set(id),
        restaurant_id: Set(restaurant_id),
        name: Set(name.into()),
        description: Set(None),
        price: Set(price),
        cost_price: Set(None),
        status: Set(status.into()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
    id
}

pub async fn insert_recipe(app: &TestApp, menu_item_id: Uuid, is_active: bool) -> Uuid {
    let id = Uuid::new_v4();
    recipe::ActiveModel {
        id: Set(id),
        menu_item_id: Set(menu_item_id),
        is_active: Set(is_active),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
    id
}

pub async fn insert_ingredient(
    app: &TestApp,
    recipe_id: Uuid,
    inventory_item_id: Uuid,
    quantity_per_serving: Decimal,
    unit: &str,
    is_optional: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    recipe_ingredient::ActiveModel {
        id: Set(id),
        recipe_id: Set(recipe_id),
        inventory_item_id: Set(inventory_item_id),
        quantity_per_serving: Set(quantity_per_serving),
        unit: Set(unit.into()),
        is_optional: Set(is_optional),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
    id
}

/// Current stock for an item, read straight from the database.
pub async fn stock_of(app: &TestApp, inventory_item_id: Uuid) -> Decimal {
    use sea_orm::EntityTrait;
    inventory_item::Entity::find_by_id(inventory_item_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("inventory item should exist")
        .quantity_in_stock
}

/// Row counts used by the atomicity assertions.
pub async fn table_counts(app: &TestApp) -> (u64, u64, u64) {
    use restaurant_os_api::entities::{inventory_transaction, sale, sale_line_item};
    use sea_orm::{EntityTrait, PaginatorTrait};

    let sales = sale::Entity::find().count(&*app.state.db).await.unwrap();
    let lines = sale_line_item::Entity::find()
        .count(&*app.state.db)
        .await
        .unwrap();
    let ledger = inventory_transaction::Entity::find()
        .count(&*app.state.db)
        .await
        .unwrap();
    (sales, lines, ledger)
}
