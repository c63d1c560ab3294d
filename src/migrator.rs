use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_restaurants_table::Migration),
            Box::new(m20240101_000002_create_branches_table::Migration),
            Box::new(m20240101_000003_create_menu_items_table::Migration),
            Box::new(m20240101_000004_create_inventory_items_table::Migration),
            Box::new(m20240101_000005_create_recipes_tables::Migration),
            Box::new(m20240101_000006_create_customers_table::Migration),
            Box::new(m20240101_000007_create_sales_tables::Migration),
            Box::new(m20240101_000008_create_inventory_transactions_table::Migration),
            Box::new(m20240101_000009_create_sync_logs_table::Migration),
        ]
    }
}

// Migration implementations
//
// Foreign key policy is deliberate per relation: composition cascades
// (sale lines with their sale, ingredients with their recipe), history
// restricts (sales and audit rows pin the catalog rows they reference).

mod m20240101_000001_create_restaurants_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_restaurants_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Restaurants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Restaurants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Restaurants::Name).string().not_null())
                        .col(ColumnDef::new(Restaurants::Location).string())
                        .col(
                            ColumnDef::new(Restaurants::TaxRate)
                                .decimal()
                                .not_null()
                                .default("17.00"),
                        )
                        .col(
                            ColumnDef::new(Restaurants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Restaurants::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Restaurants {
        Table,
        Id,
        Name,
        Location,
        TaxRate,
        CreatedAt,
    }
}

mod m20240101_000002_create_branches_table {
    use super::m20240101_000001_create_restaurants_table::Restaurants;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_branches_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Branches::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Branches::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Branches::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(Branches::Name).string().not_null())
                        .col(ColumnDef::new(Branches::City).string().not_null())
                        .col(ColumnDef::new(Branches::Address).string().not_null())
                        .col(ColumnDef::new(Branches::Phone).string())
                        .col(
                            ColumnDef::new(Branches::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Branches::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_branches_restaurant")
                                .from(Branches::Table, Branches::RestaurantId)
                                .to(Restaurants::Table, Restaurants::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Branches::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Branches {
        Table,
        Id,
        RestaurantId,
        Name,
        City,
        Address,
        Phone,
        IsActive,
        CreatedAt,
    }
}

mod m20240101_000003_create_menu_items_table {
    use super::m20240101_000001_create_restaurants_table::Restaurants;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_menu_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MenuItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MenuItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MenuItems::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(MenuItems::Name).string().not_null())
                        .col(ColumnDef::new(MenuItems::Description).string())
                        .col(ColumnDef::new(MenuItems::Price).decimal().not_null())
                        .col(ColumnDef::new(MenuItems::CostPrice).decimal())
                        .col(
                            ColumnDef::new(MenuItems::Status)
                                .string()
                                .not_null()
                                .default("available"),
                        )
                        .col(
                            ColumnDef::new(MenuItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_items_restaurant")
                                .from(MenuItems::Table, MenuItems::RestaurantId)
                                .to(Restaurants::Table, Restaurants::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_items_restaurant")
                        .table(MenuItems::Table)
                        .col(MenuItems::RestaurantId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MenuItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum MenuItems {
        Table,
        Id,
        RestaurantId,
        Name,
        Description,
        Price,
        CostPrice,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_inventory_items_table {
    use super::m20240101_000001_create_restaurants_table::Restaurants;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::RestaurantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::QuantityInStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Unit)
                                .string()
                                .not_null()
                                .default("kg"),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ReorderLevel)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ReorderQuantity)
                                .decimal()
                                .not_null()
                                .default(10),
                        )
                        .col(ColumnDef::new(InventoryItems::UnitCost).decimal())
                        .col(
                            ColumnDef::new(InventoryItems::LastRestockedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_items_restaurant")
                                .from(InventoryItems::Table, InventoryItems::RestaurantId)
                                .to(Restaurants::Table, Restaurants::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum InventoryItems {
        Table,
        Id,
        RestaurantId,
        Name,
        QuantityInStock,
        Unit,
        ReorderLevel,
        ReorderQuantity,
        UnitCost,
        LastRestockedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_recipes_tables {
    use super::m20240101_000003_create_menu_items_table::MenuItems;
    use super::m20240101_000004_create_inventory_items_table::InventoryItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_recipes_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Recipes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Recipes::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Recipes::MenuItemId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Recipes::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Recipes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Recipes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipes_menu_item")
                                .from(Recipes::Table, Recipes::MenuItemId)
                                .to(MenuItems::Table, MenuItems::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RecipeIngredients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RecipeIngredients::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::RecipeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::InventoryItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::QuantityPerServing)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::Unit)
                                .string()
                                .not_null()
                                .default("kg"),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::IsOptional)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipe_ingredients_recipe")
                                .from(RecipeIngredients::Table, RecipeIngredients::RecipeId)
                                .to(Recipes::Table, Recipes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipe_ingredients_inventory_item")
                                .from(
                                    RecipeIngredients::Table,
                                    RecipeIngredients::InventoryItemId,
                                )
                                .to(InventoryItems::Table, InventoryItems::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipe_ingredients_unique")
                        .table(RecipeIngredients::Table)
                        .col(RecipeIngredients::RecipeId)
                        .col(RecipeIngredients::InventoryItemId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RecipeIngredients::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Recipes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Recipes {
        Table,
        Id,
        MenuItemId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum RecipeIngredients {
        Table,
        Id,
        RecipeId,
        InventoryItemId,
        QuantityPerServing,
        Unit,
        IsOptional,
    }
}

mod m20240101_000006_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Contact)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::Email).string())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Customers {
        Table,
        Id,
        Name,
        Contact,
        Email,
        CreatedAt,
    }
}

mod m20240101_000007_create_sales_tables {
    use super::m20240101_000002_create_branches_table::Branches;
    use super::m20240101_000003_create_menu_items_table::MenuItems;
    use super::m20240101_000006_create_customers_table::Customers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_sales_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sales::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Sales::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Sales::CustomerId).uuid())
                        .col(ColumnDef::new(Sales::CashierId).uuid())
                        .col(ColumnDef::new(Sales::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(Sales::Subtotal).decimal().not_null())
                        .col(ColumnDef::new(Sales::TaxAmount).decimal().not_null())
                        .col(
                            ColumnDef::new(Sales::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Sales::Total).decimal().not_null())
                        .col(ColumnDef::new(Sales::OfflineId).string().unique_key())
                        .col(ColumnDef::new(Sales::SyncedAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(Sales::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_branch")
                                .from(Sales::Table, Sales::BranchId)
                                .to(Branches::Table, Branches::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_customer")
                                .from(Sales::Table, Sales::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_branch_created_at")
                        .table(Sales::Table)
                        .col(Sales::BranchId)
                        .col(Sales::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SaleLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleLineItems::SaleId).uuid().not_null())
                        .col(ColumnDef::new(SaleLineItems::MenuItemId).uuid().not_null())
                        .col(ColumnDef::new(SaleLineItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(SaleLineItems::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleLineItems::TaxAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleLineItems::LineTotal)
                                .decimal()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_line_items_sale")
                                .from(SaleLineItems::Table, SaleLineItems::SaleId)
                                .to(Sales::Table, Sales::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_line_items_menu_item")
                                .from(SaleLineItems::Table, SaleLineItems::MenuItemId)
                                .to(MenuItems::Table, MenuItems::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sale_line_items_sale")
                        .table(SaleLineItems::Table)
                        .col(SaleLineItems::SaleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SaleLineItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Sales {
        Table,
        Id,
        BranchId,
        CustomerId,
        CashierId,
        PaymentMethod,
        Subtotal,
        TaxAmount,
        DiscountAmount,
        Total,
        OfflineId,
        SyncedAt,
        CreatedAt,
    }

    #[derive(Iden)]
    pub enum SaleLineItems {
        Table,
        Id,
        SaleId,
        MenuItemId,
        Quantity,
        UnitPrice,
        TaxAmount,
        LineTotal,
    }
}

mod m20240101_000008_create_inventory_transactions_table {
    use super::m20240101_000004_create_inventory_items_table::InventoryItems;
    use super::m20240101_000007_create_sales_tables::Sales;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_inventory_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Append-only at the storage-policy level: the application never
            // issues UPDATE or DELETE against this table.
            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::InventoryItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Type)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Unit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::PreviousQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::NewQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryTransactions::SaleId).uuid())
                        .col(ColumnDef::new(InventoryTransactions::ActedBy).uuid())
                        .col(ColumnDef::new(InventoryTransactions::Notes).string())
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_transactions_item")
                                .from(
                                    InventoryTransactions::Table,
                                    InventoryTransactions::InventoryItemId,
                                )
                                .to(InventoryItems::Table, InventoryItems::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_transactions_sale")
                                .from(
                                    InventoryTransactions::Table,
                                    InventoryTransactions::SaleId,
                                )
                                .to(Sales::Table, Sales::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_item_created_at")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::InventoryItemId)
                        .col(InventoryTransactions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum InventoryTransactions {
        Table,
        Id,
        InventoryItemId,
        Type,
        Quantity,
        Unit,
        PreviousQuantity,
        NewQuantity,
        SaleId,
        ActedBy,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000009_create_sync_logs_table {
    use super::m20240101_000002_create_branches_table::Branches;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_sync_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SyncLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SyncLogs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(SyncLogs::BranchId).uuid())
                        .col(ColumnDef::new(SyncLogs::UserId).uuid())
                        .col(ColumnDef::new(SyncLogs::EventType).string().not_null())
                        .col(
                            ColumnDef::new(SyncLogs::SalesSynced)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SyncLogs::SalesFailed)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SyncLogs::Details).text().not_null())
                        .col(
                            ColumnDef::new(SyncLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sync_logs_branch")
                                .from(SyncLogs::Table, SyncLogs::BranchId)
                                .to(Branches::Table, Branches::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SyncLogs::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum SyncLogs {
        Table,
        Id,
        BranchId,
        UserId,
        EventType,
        SalesSynced,
        SalesFailed,
        Details,
        CreatedAt,
    }
}
