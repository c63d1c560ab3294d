use axum::{
    extract::{Extension, Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::inventory_transaction::TransactionType,
    errors::ApiError,
    handlers::common::{
        map_service_error, success_response, PaginatedResponse, PaginationParams,
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Signed: positive adds stock, negative removes it.
    pub quantity: Decimal,
    /// One of `adjustment`, `waste`, `return`.
    pub transaction_type: String,
    pub notes: Option<String>,
}

/// GET /inventory: paginated inventory listing.
async fn list_inventory(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (items, total) = state
        .services
        .inventory
        .list_inventory(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// GET /inventory/low-stock: items at or below their reorder level.
async fn low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .inventory
        .low_stock()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

/// POST /inventory/{id}/restock: receive stock through the ledger.
async fn restock(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .services
        .inventory
        .restock(&user.scope(), id, payload.quantity, payload.notes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(serde_json::json!({
        "inventory_item_id": entry.inventory_item_id,
        "quantity_added": entry.quantity,
        "previous_quantity": entry.previous_quantity,
        "new_quantity": entry.new_quantity,
        "unit": entry.unit,
    })))
}

/// POST /inventory/{id}/adjust: signed manual correction through the ledger.
async fn adjust(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_type = TransactionType::from_str(&payload.transaction_type).ok_or_else(|| {
        ApiError::ValidationError(format!(
            "unknown transaction type '{}'",
            payload.transaction_type
        ))
    })?;

    let entry = state
        .services
        .inventory
        .adjust(
            &user.scope(),
            id,
            payload.quantity,
            transaction_type,
            payload.notes,
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(serde_json::json!({
        "inventory_item_id": entry.inventory_item_id,
        "quantity": entry.quantity,
        "previous_quantity": entry.previous_quantity,
        "new_quantity": entry.new_quantity,
        "unit": entry.unit,
    })))
}

/// GET /inventory/{id}/transactions: audit trail page, newest first.
async fn transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (rows, total) = state
        .services
        .inventory
        .transactions(id, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        rows,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/low-stock", get(low_stock))
        .route("/{id}/restock", post(restock))
        .route("/{id}/adjust", post(adjust))
        .route("/{id}/transactions", get(transactions))
}
