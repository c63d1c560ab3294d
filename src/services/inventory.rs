//! Inventory reads and managed stock mutations. Every mutation goes through
//! the stock ledger so the audit trail stays complete.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    auth::{AccessScope, Role},
    entities::{
        inventory_item::{self, Entity as InventoryItemEntity},
        inventory_transaction::{self, Entity as InventoryTransactionEntity, TransactionType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::{self, LedgerContext, LedgerEntry},
};

/// Service for inventory listings and ledger-backed stock management
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Lists inventory items with pagination.
    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_item::Model>, u64), ServiceError> {
        let limit = limit.max(1);
        let page = page.max(1) - 1;
        let paginator = InventoryItemEntity::find()
            .order_by_asc(inventory_item::Column::Name)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "failed to count inventory items");
            ServiceError::db_error(e)
        })?;
        let items = paginator.fetch_page(page).await.map_err(|e| {
            error!(error = %e, "failed to fetch inventory items");
            ServiceError::db_error(e)
        })?;

        Ok((items, total))
    }

    /// Items at or below their reorder level.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<inventory_item::Model>, ServiceError> {
        InventoryItemEntity::find()
            .filter(
                Expr::col(inventory_item::Column::QuantityInStock)
                    .lte(Expr::col(inventory_item::Column::ReorderLevel)),
            )
            .order_by_asc(inventory_item::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Receives new stock. The increment and its audit row commit together.
    #[instrument(skip(self, scope))]
    pub async fn restock(
        &self,
        scope: &AccessScope,
        inventory_item_id: Uuid,
        quantity: Decimal,
        notes: Option<String>,
    ) -> Result<LedgerEntry, ServiceError> {
        ensure_inventory_manager(scope)?;

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let ctx = LedgerContext::manual(TransactionType::Restock, scope.user_id, notes);
        let entry = ledger::add(&txn, inventory_item_id, quantity, &ctx).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::StockRestocked {
                inventory_item_id,
                quantity: entry.quantity,
                new_quantity: entry.new_quantity,
            })
            .await;

        Ok(entry)
    }

    /// Applies a signed correction. Positive quantities add stock, negative
    /// quantities remove it (and can never push the balance below zero).
    #[instrument(skip(self, scope))]
    pub async fn adjust(
        &self,
        scope: &AccessScope,
        inventory_item_id: Uuid,
        quantity: Decimal,
        transaction_type: TransactionType,
        notes: Option<String>,
    ) -> Result<LedgerEntry, ServiceError> {
        ensure_inventory_manager(scope)?;

        if !matches!(
            transaction_type,
            TransactionType::Adjustment | TransactionType::Waste | TransactionType::Return
        ) {
            return Err(ServiceError::ValidationError(format!(
                "transaction type '{}' is not a manual adjustment",
                transaction_type.as_str()
            )));
        }
        if quantity == Decimal::ZERO {
            return Err(ServiceError::InvalidQuantity(
                "adjustment quantity must not be zero".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let ctx = LedgerContext::manual(transaction_type, scope.user_id, notes);
        let entry = if quantity > Decimal::ZERO {
            ledger::add(&txn, inventory_item_id, quantity, &ctx).await?
        } else {
            ledger::deduct(&txn, inventory_item_id, -quantity, &ctx).await?
        };
        txn.commit().await.map_err(ServiceError::db_error)?;

        Ok(entry)
    }

    /// Read-only page of the audit trail for one item, newest first.
    #[instrument(skip(self))]
    pub async fn transactions(
        &self,
        inventory_item_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_transaction::Model>, u64), ServiceError> {
        let limit = limit.max(1);
        let page = page.max(1) - 1;
        let paginator = InventoryTransactionEntity::find()
            .filter(inventory_transaction::Column::InventoryItemId.eq(inventory_item_id))
            .order_by_desc(inventory_transaction::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }
}

/// Stock corrections are a manager's job; branch staff only move stock
/// implicitly through sales.
fn ensure_inventory_manager(scope: &AccessScope) -> Result<(), ServiceError> {
    match scope.role {
        Role::Admin | Role::Owner | Role::Manager => Ok(()),
        Role::Staff => Err(ServiceError::Forbidden(
            "inventory adjustments require a manager role".to_string(),
        )),
    }
}
