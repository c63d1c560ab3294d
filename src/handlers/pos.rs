use axum::{
    extract::{Extension, Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response, validate_input},
    services::pos::CreateSaleInput,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct SyncBatchRequest {
    #[validate(length(min = 1, message = "sales batch must not be empty"))]
    pub sales: Vec<CreateSaleInput>,
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub branch_id: Uuid,
}

/// POST /pos/sales: capture one sale atomically.
async fn create_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateSaleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state
        .services
        .pos
        .create_sale(&user.scope(), payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(receipt))
}

/// POST /pos/sync: replay a batch of offline sales with per-sale
/// failure isolation. Always 200; partial success lives in the body.
async fn sync_offline_sales(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SyncBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let report = state
        .services
        .sync
        .sync_batch(&user.scope(), payload.sales)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({
        "synced": report.synced,
        "failed": report.failed,
        "results": {
            "successful": report.successful,
            "failed": report.failures,
        },
    })))
}

/// GET /pos/menu-items: sellable items with tax-inclusive prices.
async fn menu_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .pos
        .menu_items(&user.scope(), query.branch_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

/// GET /sales/{id}: stored sale with its line snapshots.
async fn get_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .pos
        .get_sale(&user.scope(), id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

pub fn pos_routes() -> Router<AppState> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sync", post(sync_offline_sales))
        .route("/menu-items", get(menu_items))
}

pub fn sales_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(get_sale))
}
