//! Recipe traversal: availability-for-N-servings checks and deduction plans.
//!
//! All functions run against a caller-supplied connection so the coordinator
//! can use them both for the advisory pre-check (plain pool connection) and
//! for commit-time resolution (inside the open transaction).

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    entities::{
        inventory_item::{self, Entity as InventoryItemEntity},
        recipe::{self, Entity as RecipeEntity},
        recipe_ingredient::{self, Entity as RecipeIngredientEntity},
    },
    errors::{IngredientShortage, ServiceError},
};

/// One planned stock deduction for a sale line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionRequest {
    pub inventory_item_id: Uuid,
    pub quantity: Decimal,
    pub unit: String,
}

/// Result of an availability check for one menu item.
#[derive(Debug, Clone)]
pub struct AvailabilityReport {
    pub is_available: bool,
    pub shortages: Vec<IngredientShortage>,
}

impl AvailabilityReport {
    fn unconstrained() -> Self {
        Self {
            is_available: true,
            shortages: Vec::new(),
        }
    }
}

/// Loads the active recipe's non-optional ingredients together with their
/// inventory items. A menu item without an active recipe has no inventory
/// dependency and yields an empty list.
async fn required_ingredients<C: ConnectionTrait>(
    db: &C,
    menu_item_id: Uuid,
) -> Result<Vec<(recipe_ingredient::Model, inventory_item::Model)>, ServiceError> {
    let recipe = RecipeEntity::find()
        .filter(recipe::Column::MenuItemId.eq(menu_item_id))
        .filter(recipe::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;

    let Some(recipe) = recipe else {
        return Ok(Vec::new());
    };

    let mut ingredients = RecipeIngredientEntity::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
        .filter(recipe_ingredient::Column::IsOptional.eq(false))
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;

    // Deterministic traversal keeps deduction ordering stable across sales.
    ingredients.sort_by_key(|i| i.inventory_item_id);

    let item_ids: Vec<Uuid> = ingredients.iter().map(|i| i.inventory_item_id).collect();
    let items: HashMap<Uuid, inventory_item::Model> = InventoryItemEntity::find()
        .filter(inventory_item::Column::Id.is_in(item_ids))
        .all(db)
        .await
        .map_err(ServiceError::db_error)?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    ingredients
        .into_iter()
        .map(|ingredient| {
            let item = items.get(&ingredient.inventory_item_id).cloned().ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "recipe ingredient {} references missing inventory item {}",
                    ingredient.id, ingredient.inventory_item_id
                ))
            })?;
            Ok((ingredient, item))
        })
        .collect()
}

/// Checks whether `servings` portions of a menu item can be made from
/// current stock, reporting every shortage rather than the first.
pub async fn check_availability<C: ConnectionTrait>(
    db: &C,
    menu_item_id: Uuid,
    servings: i32,
) -> Result<AvailabilityReport, ServiceError> {
    if servings <= 0 {
        return Err(ServiceError::InvalidQuantity(format!(
            "servings must be positive, got {}",
            servings
        )));
    }

    let pairs = required_ingredients(db, menu_item_id).await?;
    if pairs.is_empty() {
        return Ok(AvailabilityReport::unconstrained());
    }

    let mut shortages = Vec::new();
    for (ingredient, item) in pairs {
        let required = ingredient.quantity_per_serving * Decimal::from(servings);
        let available = item.quantity_in_stock;
        if available < required {
            shortages.push(IngredientShortage {
                inventory_item_id: item.id,
                ingredient_name: item.name,
                required,
                available,
                shortage: required - available,
                unit: ingredient.unit,
            });
        }
    }

    Ok(AvailabilityReport {
        is_available: shortages.is_empty(),
        shortages,
    })
}

/// Expands a menu item into the stock deductions `servings` portions need,
/// one request per non-optional ingredient, in ascending item-id order.
pub async fn resolve_deductions<C: ConnectionTrait>(
    db: &C,
    menu_item_id: Uuid,
    servings: i32,
) -> Result<Vec<DeductionRequest>, ServiceError> {
    if servings <= 0 {
        return Err(ServiceError::InvalidQuantity(format!(
            "servings must be positive, got {}",
            servings
        )));
    }

    let pairs = required_ingredients(db, menu_item_id).await?;
    Ok(pairs
        .into_iter()
        .map(|(ingredient, _)| DeductionRequest {
            inventory_item_id: ingredient.inventory_item_id,
            quantity: ingredient.quantity_per_serving * Decimal::from(servings),
            unit: ingredient.unit,
        })
        .collect())
}
