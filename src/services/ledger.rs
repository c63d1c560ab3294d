//! The stock ledger: the only code path that mutates
//! `inventory_items.quantity_in_stock`, and the only writer of the
//! append-only `inventory_transactions` audit trail.
//!
//! Both functions run on the caller's connection. Inside a transaction the
//! stock change and its audit row commit or roll back together; a deduction
//! that cannot log never happened.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

use crate::{
    entities::{
        inventory_item::{self, Entity as InventoryItemEntity},
        inventory_transaction::{self, TransactionType},
    },
    errors::ServiceError,
};

/// Who and what caused a stock mutation; stamped onto the audit row.
#[derive(Debug, Clone)]
pub struct LedgerContext {
    pub transaction_type: TransactionType,
    pub sale_id: Option<Uuid>,
    pub acted_by: Option<Uuid>,
    pub notes: Option<String>,
}

impl LedgerContext {
    pub fn sale(sale_id: Uuid, acted_by: Option<Uuid>) -> Self {
        Self {
            transaction_type: TransactionType::Sale,
            sale_id: Some(sale_id),
            acted_by,
            notes: None,
        }
    }

    pub fn manual(transaction_type: TransactionType, acted_by: Uuid, notes: Option<String>) -> Self {
        Self {
            transaction_type,
            sale_id: None,
            acted_by: Some(acted_by),
            notes,
        }
    }
}

/// Outcome of one ledger mutation, mirrored from the audit row.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub transaction_id: Uuid,
    pub inventory_item_id: Uuid,
    pub item_name: String,
    pub quantity: Decimal,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    pub unit: String,
    pub reorder_level: Decimal,
}

impl LedgerEntry {
    pub fn left_below_reorder_level(&self) -> bool {
        self.new_quantity <= self.reorder_level
    }
}

/// Removes `quantity` from stock.
///
/// The decrement is guarded in SQL (`quantity_in_stock >= quantity`), so it
/// is authoritative under concurrency: of two sales racing for the same
/// narrow stock window, exactly one decrements and the other gets
/// `InsufficientStock` regardless of what any earlier pre-check saw.
pub async fn deduct<C: ConnectionTrait>(
    db: &C,
    inventory_item_id: Uuid,
    quantity: Decimal,
    ctx: &LedgerContext,
) -> Result<LedgerEntry, ServiceError> {
    if quantity <= Decimal::ZERO {
        return Err(ServiceError::InvalidQuantity(format!(
            "deduction quantity must be positive, got {}",
            quantity
        )));
    }

    let item = find_item(db, inventory_item_id).await?;

    let result = InventoryItemEntity::update_many()
        .col_expr(
            inventory_item::Column::QuantityInStock,
            Expr::col(inventory_item::Column::QuantityInStock).sub(quantity),
        )
        .col_expr(inventory_item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(inventory_item::Column::Id.eq(inventory_item_id))
        .filter(inventory_item::Column::QuantityInStock.gte(quantity))
        .exec(db)
        .await
        .map_err(ServiceError::db_error)?;

    if result.rows_affected == 0 {
        // Lost the race (or never had the stock). Re-read so the error
        // reports what is actually available now.
        let current = find_item(db, inventory_item_id).await?;
        return Err(ServiceError::InsufficientStock {
            inventory_item_id,
            item_name: current.name,
            requested: quantity,
            available: current.quantity_in_stock,
            unit: current.unit,
        });
    }

    let updated = find_item(db, inventory_item_id).await?;
    let previous_quantity = updated.quantity_in_stock + quantity;

    let entry = append_audit_row(db, &updated, quantity, previous_quantity, ctx).await?;

    debug!(
        item = %updated.name,
        %quantity,
        new_quantity = %updated.quantity_in_stock,
        "stock deducted"
    );

    Ok(LedgerEntry {
        transaction_id: entry,
        inventory_item_id,
        item_name: item.name,
        quantity,
        previous_quantity,
        new_quantity: updated.quantity_in_stock,
        unit: updated.unit,
        reorder_level: updated.reorder_level,
    })
}

/// Adds `quantity` to stock. No upper bound; used for restocks, returns and
/// upward adjustments. Restocks also stamp `last_restocked_at`.
pub async fn add<C: ConnectionTrait>(
    db: &C,
    inventory_item_id: Uuid,
    quantity: Decimal,
    ctx: &LedgerContext,
) -> Result<LedgerEntry, ServiceError> {
    if quantity <= Decimal::ZERO {
        return Err(ServiceError::InvalidQuantity(format!(
            "addition quantity must be positive, got {}",
            quantity
        )));
    }

    let item = find_item(db, inventory_item_id).await?;
    let previous_quantity = item.quantity_in_stock;
    let new_quantity = previous_quantity + quantity;

    let mut active: inventory_item::ActiveModel = item.clone().into();
    active.quantity_in_stock = Set(new_quantity);
    active.updated_at = Set(Utc::now());
    if ctx.transaction_type == TransactionType::Restock {
        active.last_restocked_at = Set(Some(Utc::now()));
    }
    let updated = active.update(db).await.map_err(ServiceError::db_error)?;

    let entry = append_audit_row(db, &updated, quantity, previous_quantity, ctx).await?;

    debug!(
        item = %updated.name,
        %quantity,
        new_quantity = %updated.quantity_in_stock,
        "stock added"
    );

    Ok(LedgerEntry {
        transaction_id: entry,
        inventory_item_id,
        item_name: item.name,
        quantity,
        previous_quantity,
        new_quantity: updated.quantity_in_stock,
        unit: updated.unit,
        reorder_level: updated.reorder_level,
    })
}

async fn find_item<C: ConnectionTrait>(
    db: &C,
    inventory_item_id: Uuid,
) -> Result<inventory_item::Model, ServiceError> {
    InventoryItemEntity::find_by_id(inventory_item_id)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("inventory item {} not found", inventory_item_id))
        })
}

async fn append_audit_row<C: ConnectionTrait>(
    db: &C,
    item: &inventory_item::Model,
    quantity: Decimal,
    previous_quantity: Decimal,
    ctx: &LedgerContext,
) -> Result<Uuid, ServiceError> {
    let transaction_id = Uuid::new_v4();
    let row = inventory_transaction::ActiveModel {
        id: Set(transaction_id),
        inventory_item_id: Set(item.id),
        r#type: Set(ctx.transaction_type.as_str().to_string()),
        quantity: Set(quantity),
        unit: Set(item.unit.clone()),
        previous_quantity: Set(previous_quantity),
        new_quantity: Set(item.quantity_in_stock),
        sale_id: Set(ctx.sale_id),
        acted_by: Set(ctx.acted_by),
        notes: Set(ctx.notes.clone()),
        created_at: Set(Utc::now()),
    };

    row.insert(db).await.map_err(ServiceError::db_error)?;
    Ok(transaction_id)
}
