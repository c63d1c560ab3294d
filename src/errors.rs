use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Standard error body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional structured detail (validation fields, shortage lists)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Missing stock for one ingredient of one basket line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientShortage {
    pub inventory_item_id: Uuid,
    pub ingredient_name: String,
    pub required: Decimal,
    pub available: Decimal,
    pub shortage: Decimal,
    pub unit: String,
}

/// All shortages reported for a single menu item in the basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineShortages {
    pub menu_item_id: Uuid,
    pub menu_item_name: String,
    pub quantity: i32,
    pub shortages: Vec<IngredientShortage>,
}

/// Structured payload behind `ServiceError::InsufficientInventory`.
///
/// Carries every offending line and every missing ingredient, never just the
/// first offender, so a cashier can drop the unavailable items or escalate
/// to a manager override instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientInventoryError {
    pub lines: Vec<LineShortages>,
}

impl InsufficientInventoryError {
    pub fn new(lines: Vec<LineShortages>) -> Self {
        Self { lines }
    }

    /// Wraps a single commit-time ledger failure in the same shape the
    /// availability pre-check produces.
    pub fn single(line: LineShortages) -> Self {
        Self { lines: vec![line] }
    }
}

impl std::fmt::Display for InsufficientInventoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<&str> = self
            .lines
            .iter()
            .map(|l| l.menu_item_name.as_str())
            .collect();
        write!(f, "insufficient inventory for: {}", items.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    InsufficientInventory(InsufficientInventoryError),

    #[error("Insufficient stock for {item_name}: requested {requested}, available {available}")]
    InsufficientStock {
        inventory_item_id: Uuid,
        item_name: String,
        requested: Decimal,
        available: Decimal,
        unit: String,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// Converts a commit-time ledger failure into the request-level shortage
    /// shape; the caller is the same whether the pre-check or the
    /// authoritative check caught it.
    pub fn into_insufficient_inventory(
        self,
        menu_item_id: Uuid,
        menu_item_name: &str,
        quantity: i32,
    ) -> Self {
        match self {
            ServiceError::InsufficientStock {
                inventory_item_id,
                item_name,
                requested,
                available,
                unit,
            } => ServiceError::InsufficientInventory(InsufficientInventoryError::single(
                LineShortages {
                    menu_item_id,
                    menu_item_name: menu_item_name.to_string(),
                    quantity,
                    shortages: vec![IngredientShortage {
                        inventory_item_id,
                        ingredient_name: item_name,
                        required: requested,
                        available,
                        shortage: requested - available,
                        unit,
                    }],
                },
            )),
            other => other,
        }
    }

    /// Returns the HTTP status code for this error.
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_)
            | Self::EventError(_)
            | Self::InternalError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::InsufficientInventory(_)
            | Self::InsufficientStock { .. }
            | Self::InvalidQuantity(_)
            | Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Structured detail attached to the JSON body, when the error carries
    /// more than a message.
    fn response_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::InsufficientInventory(err) => Some(json!({
                "code": "insufficient_inventory",
                "lines": err.lines,
            })),
            Self::InsufficientStock {
                inventory_item_id,
                item_name,
                requested,
                available,
                unit,
            } => Some(json!({
                "code": "insufficient_inventory",
                "lines": [{
                    "shortages": [{
                        "inventory_item_id": inventory_item_id,
                        "ingredient_name": item_name,
                        "required": requested,
                        "available": available,
                        "shortage": requested - available,
                        "unit": unit,
                    }],
                }],
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.response_details(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

/// API error type for HTTP handler boundaries
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(service_error) => service_error.into_response(),
            ApiError::ValidationError(msg) => {
                error_body(StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Unauthorized => {
                error_body(StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response()
            }
        }
    }
}

fn error_body(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message,
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn shortage() -> IngredientShortage {
        IngredientShortage {
            inventory_item_id: Uuid::new_v4(),
            ingredient_name: "Chicken".into(),
            required: dec!(2.5),
            available: dec!(2.0),
            shortage: dec!(0.5),
            unit: "kg".into(),
        }
    }

    #[test]
    fn insufficient_inventory_maps_to_bad_request() {
        let err = ServiceError::InsufficientInventory(InsufficientInventoryError::single(
            LineShortages {
                menu_item_id: Uuid::new_v4(),
                menu_item_name: "Chicken Tikka".into(),
                quantity: 5,
                shortages: vec![shortage()],
            },
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let details = err.response_details().expect("details expected");
        assert_eq!(details["code"], "insufficient_inventory");
        assert_eq!(details["lines"][0]["shortages"][0]["shortage"], "0.5");
    }

    #[test]
    fn ledger_failure_folds_into_request_level_shape() {
        let item_id = Uuid::new_v4();
        let menu_id = Uuid::new_v4();
        let err = ServiceError::InsufficientStock {
            inventory_item_id: item_id,
            item_name: "Chicken".into(),
            requested: dec!(2.5),
            available: dec!(2.0),
            unit: "kg".into(),
        };
        let folded = err.into_insufficient_inventory(menu_id, "Chicken Tikka", 5);
        match folded {
            ServiceError::InsufficientInventory(inner) => {
                assert_eq!(inner.lines.len(), 1);
                assert_eq!(inner.lines[0].menu_item_id, menu_id);
                assert_eq!(inner.lines[0].shortages[0].shortage, dec!(0.5));
            }
            other => panic!("expected InsufficientInventory, got {other:?}"),
        }
    }

    #[test]
    fn database_errors_do_not_leak_internals() {
        let err = ServiceError::db_error("connection reset by peer");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response_message(), "Database error");
    }
}
