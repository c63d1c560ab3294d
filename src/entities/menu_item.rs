use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Sellability of a menu item. Stored as a string column; `Discontinued`
/// items are kept for sale history instead of being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MenuItemStatus {
    Available,
    Unavailable,
    OutOfStock,
    Discontinued,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unit sale price. Snapshotted onto sale lines at sale time.
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn status(&self) -> Option<MenuItemStatus> {
        self.status.parse().ok()
    }

    /// Whether the POS may put this item on a new sale.
    pub fn is_sellable(&self) -> bool {
        matches!(
            self.status(),
            Some(MenuItemStatus::Available) | Some(MenuItemStatus::OutOfStock)
        )
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    #[sea_orm(has_one = "super::recipe::Entity")]
    Recipe,
    #[sea_orm(has_many = "super::sale_line_item::Entity")]
    SaleLineItems,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl Related<super::sale_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
