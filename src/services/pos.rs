//! The POS sale coordinator: one entry point turns a basket into a
//! committed sale, its line-item snapshots, and the recipe-driven stock
//! deductions, or into nothing at all.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AccessScope,
    entities::{
        branch::{self, Entity as BranchEntity},
        menu_item::{self, Entity as MenuItemEntity},
        restaurant::Entity as RestaurantEntity,
        sale::{self, Entity as SaleEntity, PaymentMethod},
        sale_line_item::{self, Entity as SaleLineItemEntity},
    },
    errors::{InsufficientInventoryError, LineShortages, ServiceError},
    events::{Event, EventSender},
    services::{calculator, customers, ledger, recipes},
};

/// One basket line as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleLineInput {
    pub menu_item_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

/// Everything needed to capture one sale.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSaleInput {
    pub branch_id: Uuid,
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Client identifier for offline-originated sales; replays are idempotent.
    pub offline_id: Option<String>,
    /// Skips the advisory availability pre-check (manager override). The
    /// commit-time ledger check still applies; stock can never go negative.
    #[serde(default)]
    pub skip_inventory_check: bool,
    #[validate(
        length(min = 1, message = "basket must contain at least one item"),
        nested
    )]
    pub items: Vec<SaleLineInput>,
}

/// A stock deduction actually applied while committing a sale.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedDeduction {
    pub inventory_item_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub new_quantity: Decimal,
    pub unit: String,
}

/// The committed sale as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub sale_id: Uuid,
    pub branch_id: Uuid,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub items_count: usize,
    pub inventory_deductions: Vec<AppliedDeduction>,
    pub created_at: DateTime<Utc>,
    /// True when an `offline_id` resolved to an already-committed sale.
    pub replayed: bool,
}

/// Read-only view of a stored sale with its line snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct SaleDetail {
    pub sale: sale::Model,
    pub items: Vec<sale_line_item::Model>,
}

/// A menu item as shown on the POS screen, priced with the tenant tax rate.
#[derive(Debug, Clone, Serialize)]
pub struct PosMenuItem {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub tax_rate: Decimal,
    pub price_with_tax: Decimal,
}

/// Coordinates sale capture: validation, totals, availability, and the
/// atomic commit spanning sale, line items and every stock deduction.
#[derive(Clone)]
pub struct PosService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

struct PricedLine {
    input: SaleLineInput,
    menu_item: menu_item::Model,
    totals: calculator::LineTotals,
}

impl PosService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Captures one sale. Everything between the first write and the last
    /// deduction is a single transaction: any failure rolls back the sale,
    /// its lines and every deduction already applied in this invocation.
    #[instrument(skip(self, scope, input), fields(branch_id = %input.branch_id))]
    pub async fn create_sale(
        &self,
        scope: &AccessScope,
        input: CreateSaleInput,
    ) -> Result<SaleReceipt, ServiceError> {
        scope.ensure_branch(input.branch_id)?;
        input.validate()?;

        // Retried offline submissions resolve to the sale they already
        // committed instead of creating a duplicate.
        if let Some(offline_id) = input.offline_id.as_deref() {
            if let Some(existing) = self.find_by_offline_id(offline_id).await? {
                return Ok(existing);
            }
        }

        let branch = BranchEntity::find_by_id(input.branch_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("branch {} not found", input.branch_id))
            })?;

        let restaurant = RestaurantEntity::find_by_id(branch.restaurant_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "branch {} references missing restaurant {}",
                    branch.id, branch.restaurant_id
                ))
            })?;

        let lines = self.price_basket(&branch, restaurant.tax_rate, &input.items).await?;
        let line_totals: Vec<calculator::LineTotals> = lines.iter().map(|l| l.totals).collect();
        let totals = calculator::sale_totals(&line_totals, input.discount_amount)?;

        if !input.skip_inventory_check {
            self.precheck_availability(&lines).await?;
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let customer = match input.customer_contact.as_deref() {
            Some(contact) if !contact.trim().is_empty() => Some(
                customers::resolve_or_create(
                    &txn,
                    input.customer_name.as_deref(),
                    contact,
                    &self.event_sender,
                )
                .await?,
            ),
            _ => None,
        };

        let sale_id = Uuid::new_v4();
        let created_at = Utc::now();
        let sale_row = sale::ActiveModel {
            id: Set(sale_id),
            branch_id: Set(branch.id),
            customer_id: Set(customer.as_ref().map(|c| c.id)),
            cashier_id: Set(Some(scope.user_id)),
            payment_method: Set(input.payment_method.as_ref().to_string()),
            subtotal: Set(totals.subtotal),
            tax_amount: Set(totals.tax_total),
            discount_amount: Set(totals.discount),
            total: Set(totals.total),
            offline_id: Set(input.offline_id.clone()),
            synced_at: Set(input.offline_id.as_ref().map(|_| created_at)),
            created_at: Set(created_at),
        };
        sale_row.insert(&txn).await.map_err(ServiceError::db_error)?;

        for line in &lines {
            let line_row = sale_line_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale_id),
                menu_item_id: Set(line.menu_item.id),
                quantity: Set(line.input.quantity),
                unit_price: Set(line.menu_item.price),
                tax_amount: Set(line.totals.tax),
                line_total: Set(line.totals.total),
            };
            line_row.insert(&txn).await.map_err(ServiceError::db_error)?;
        }

        let deductions = self
            .apply_deductions(&txn, sale_id, scope, &lines)
            .await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.emit_post_commit_events(sale_id, branch.id, &totals, lines.len(), &deductions)
            .await;

        info!(%sale_id, total = %totals.total, deductions = deductions.len(), "sale committed");

        Ok(SaleReceipt {
            sale_id,
            branch_id: branch.id,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_total,
            discount_amount: totals.discount,
            total: totals.total,
            items_count: lines.len(),
            inventory_deductions: deductions
                .into_iter()
                .map(|entry| AppliedDeduction {
                    inventory_item_id: entry.inventory_item_id,
                    ingredient_name: entry.item_name,
                    quantity: entry.quantity,
                    new_quantity: entry.new_quantity,
                    unit: entry.unit,
                })
                .collect(),
            created_at,
            replayed: false,
        })
    }

    /// Loads a stored sale with its line snapshots.
    #[instrument(skip(self, scope))]
    pub async fn get_sale(&self, scope: &AccessScope, sale_id: Uuid) -> Result<SaleDetail, ServiceError> {
        let sale = SaleEntity::find_by_id(sale_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("sale {} not found", sale_id)))?;

        scope.ensure_branch(sale.branch_id)?;

        let items = SaleLineItemEntity::find()
            .filter(sale_line_item::Column::SaleId.eq(sale_id))
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(SaleDetail { sale, items })
    }

    /// Resolves every basket line to a sellable menu item of the branch's
    /// restaurant and prices it with the tenant tax rate.
    async fn price_basket(
        &self,
        branch: &branch::Model,
        tax_rate: Decimal,
        items: &[SaleLineInput],
    ) -> Result<Vec<PricedLine>, ServiceError> {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let menu_item = MenuItemEntity::find_by_id(item.menu_item_id)
                .one(&*self.db)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "menu item {} not found",
                        item.menu_item_id
                    ))
                })?;

            if menu_item.restaurant_id != branch.restaurant_id {
                return Err(ServiceError::ValidationError(format!(
                    "menu item {} does not belong to this restaurant",
                    menu_item.id
                )));
            }
            if !menu_item.is_sellable() {
                return Err(ServiceError::ValidationError(format!(
                    "menu item '{}' is not sellable (status: {})",
                    menu_item.name, menu_item.status
                )));
            }

            let totals = calculator::line_totals(menu_item.price, item.quantity, tax_rate)?;
            lines.push(PricedLine {
                input: item.clone(),
                menu_item,
                totals,
            });
        }
        Ok(lines)
    }

    /// Advisory pre-check: reports every offending line and all of its
    /// shortages before any write happens. The commit-time ledger check
    /// remains authoritative.
    async fn precheck_availability(&self, lines: &[PricedLine]) -> Result<(), ServiceError> {
        let mut failing = Vec::new();
        for line in lines {
            let report =
                recipes::check_availability(&*self.db, line.menu_item.id, line.input.quantity)
                    .await?;
            if !report.is_available {
                failing.push(LineShortages {
                    menu_item_id: line.menu_item.id,
                    menu_item_name: line.menu_item.name.clone(),
                    quantity: line.input.quantity,
                    shortages: report.shortages,
                });
            }
        }

        if failing.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::InsufficientInventory(
                InsufficientInventoryError::new(failing),
            ))
        }
    }

    /// Resolves recipe deductions for every line, aggregates them per
    /// inventory item, and applies them in ascending item-id order so
    /// concurrent sales over shared ingredients lock rows deterministically.
    async fn apply_deductions<C: ConnectionTrait>(
        &self,
        txn: &C,
        sale_id: Uuid,
        scope: &AccessScope,
        lines: &[PricedLine],
    ) -> Result<Vec<ledger::LedgerEntry>, ServiceError> {
        // BTreeMap keys keep the application order sorted by item id.
        let mut aggregated: BTreeMap<Uuid, (Decimal, &PricedLine)> = BTreeMap::new();
        for line in lines {
            let requests =
                recipes::resolve_deductions(txn, line.menu_item.id, line.input.quantity).await?;
            for request in requests {
                aggregated
                    .entry(request.inventory_item_id)
                    .and_modify(|(qty, _)| *qty += request.quantity)
                    .or_insert((request.quantity, line));
            }
        }

        let ctx = ledger::LedgerContext::sale(sale_id, Some(scope.user_id));
        let mut entries = Vec::with_capacity(aggregated.len());
        for (inventory_item_id, (quantity, first_line)) in aggregated {
            let entry = ledger::deduct(txn, inventory_item_id, quantity, &ctx)
                .await
                .map_err(|err| {
                    err.into_insufficient_inventory(
                        first_line.menu_item.id,
                        &first_line.menu_item.name,
                        first_line.input.quantity,
                    )
                })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    async fn emit_post_commit_events(
        &self,
        sale_id: Uuid,
        branch_id: Uuid,
        totals: &calculator::SaleTotals,
        items_count: usize,
        deductions: &[ledger::LedgerEntry],
    ) {
        self.event_sender
            .send_or_log(Event::SaleCompleted {
                sale_id,
                branch_id,
                total: totals.total,
                items_count,
            })
            .await;

        for entry in deductions {
            self.event_sender
                .send_or_log(Event::StockDeducted {
                    inventory_item_id: entry.inventory_item_id,
                    quantity: entry.quantity,
                    new_quantity: entry.new_quantity,
                    sale_id: Some(sale_id),
                })
                .await;
            if entry.left_below_reorder_level() {
                self.event_sender
                    .send_or_log(Event::StockLow {
                        inventory_item_id: entry.inventory_item_id,
                        name: entry.item_name.clone(),
                        quantity_in_stock: entry.new_quantity,
                        reorder_level: entry.reorder_level,
                    })
                    .await;
            }
        }
    }

    /// Sellable menu items for a branch's restaurant, priced with tax for
    /// POS display.
    #[instrument(skip(self, scope))]
    pub async fn menu_items(
        &self,
        scope: &AccessScope,
        branch_id: Uuid,
    ) -> Result<Vec<PosMenuItem>, ServiceError> {
        scope.ensure_branch(branch_id)?;

        let branch = BranchEntity::find_by_id(branch_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("branch {} not found", branch_id)))?;

        let restaurant = RestaurantEntity::find_by_id(branch.restaurant_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "branch {} references missing restaurant {}",
                    branch.id, branch.restaurant_id
                ))
            })?;

        let items = MenuItemEntity::find()
            .filter(menu_item::Column::RestaurantId.eq(restaurant.id))
            .filter(menu_item::Column::Status.eq("available"))
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(items
            .into_iter()
            .map(|item| {
                let tax = item.price * restaurant.tax_rate / Decimal::from(100);
                PosMenuItem {
                    id: item.id,
                    name: item.name,
                    price: item.price,
                    tax_rate: restaurant.tax_rate,
                    price_with_tax: item.price + tax,
                }
            })
            .collect())
    }

    async fn find_by_offline_id(&self, offline_id: &str) -> Result<Option<SaleReceipt>, ServiceError> {
        let existing = SaleEntity::find()
            .filter(sale::Column::OfflineId.eq(offline_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let items_count = SaleLineItemEntity::find()
            .filter(sale_line_item::Column::SaleId.eq(existing.id))
            .count(&*self.db)
            .await
            .map_err(ServiceError::db_error)? as usize;

        info!(sale_id = %existing.id, offline_id, "offline sale replayed idempotently");

        // Deductions were applied when the sale first committed; the audit
        // trail holds them. A replay reports none.
        Ok(Some(SaleReceipt {
            sale_id: existing.id,
            branch_id: existing.branch_id,
            subtotal: existing.subtotal,
            tax_amount: existing.tax_amount,
            discount_amount: existing.discount_amount,
            total: existing.total,
            items_count,
            inventory_deductions: Vec::new(),
            created_at: existing.created_at,
            replayed: true,
        }))
    }
}
