use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_categories_table::Migration),
            Box::new(m20240101_000002_create_category_attributes_table::Migration),
            Box::new(m20240101_000003_create_attribute_options_table::Migration),
            Box::new(m20240101_000004_create_products_table::Migration),
            Box::new(m20240101_000005_create_product_attribute_values_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_categories_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::Slug).string().not_null())
                        .col(ColumnDef::new(Categories::Description).text().null())
                        .col(ColumnDef::new(Categories::ParentId).uuid().null())
                        .col(
                            ColumnDef::new(Categories::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Categories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Categories::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_categories_parent_id")
                                .from(Categories::Table, Categories::ParentId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_categories_slug")
                        .table(Categories::Table)
                        .col(Categories::Slug)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_categories_parent_id")
                        .table(Categories::Table)
                        .col(Categories::ParentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Categories {
        Table,
        Id,
        Name,
        Slug,
        Description,
        ParentId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_category_attributes_table {

    use super::m20240101_000001_create_categories_table::Categories;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_category_attributes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CategoryAttributes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CategoryAttributes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CategoryAttributes::CategoryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CategoryAttributes::Name).string().not_null())
                        .col(ColumnDef::new(CategoryAttributes::Slug).string().not_null())
                        .col(
                            ColumnDef::new(CategoryAttributes::DataType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CategoryAttributes::IsRequired)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CategoryAttributes::DisplayOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CategoryAttributes::MinNumber)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CategoryAttributes::MaxNumber)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(CategoryAttributes::Regex).text().null())
                        .col(ColumnDef::new(CategoryAttributes::MaxLength).integer().null())
                        .col(ColumnDef::new(CategoryAttributes::Hint).text().null())
                        .col(
                            ColumnDef::new(CategoryAttributes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CategoryAttributes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_category_attributes_category_id")
                                .from(CategoryAttributes::Table, CategoryAttributes::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_category_attributes_category_slug")
                        .table(CategoryAttributes::Table)
                        .col(CategoryAttributes::CategoryId)
                        .col(CategoryAttributes::Slug)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CategoryAttributes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CategoryAttributes {
        Table,
        Id,
        CategoryId,
        Name,
        Slug,
        DataType,
        IsRequired,
        DisplayOrder,
        MinNumber,
        MaxNumber,
        Regex,
        MaxLength,
        Hint,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_attribute_options_table {

    use super::m20240101_000002_create_category_attributes_table::CategoryAttributes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_attribute_options_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AttributeOptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AttributeOptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AttributeOptions::CategoryAttributeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AttributeOptions::Value).string().not_null())
                        .col(ColumnDef::new(AttributeOptions::Code).string().null())
                        .col(
                            ColumnDef::new(AttributeOptions::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AttributeOptions::IsDefault)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(AttributeOptions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_attribute_options_category_attribute_id")
                                .from(
                                    AttributeOptions::Table,
                                    AttributeOptions::CategoryAttributeId,
                                )
                                .to(CategoryAttributes::Table, CategoryAttributes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_attribute_options_category_attribute_id")
                        .table(AttributeOptions::Table)
                        .col(AttributeOptions::CategoryAttributeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AttributeOptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AttributeOptions {
        Table,
        Id,
        CategoryAttributeId,
        Value,
        Code,
        SortOrder,
        IsDefault,
        CreatedAt,
    }
}

mod m20240101_000004_create_products_table {

    use super::m20240101_000001_create_categories_table::Categories;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Status)
                                .string_len(16)
                                .not_null()
                                .default("DRAFT"),
                        )
                        .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_sku")
                        .table(Products::Table)
                        .col(Products::Sku)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_status")
                        .table(Products::Table)
                        .col(Products::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_created_at")
                        .table(Products::Table)
                        .col(Products::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Sku,
        Description,
        Price,
        StockQuantity,
        Status,
        CategoryId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_product_attribute_values_table {

    use super::m20240101_000002_create_category_attributes_table::CategoryAttributes;
    use super::m20240101_000003_create_attribute_options_table::AttributeOptions;
    use super::m20240101_000004_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_product_attribute_values_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductAttributeValues::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductAttributeValues::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductAttributeValues::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductAttributeValues::CategoryAttributeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductAttributeValues::ValueText).text().null())
                        .col(
                            ColumnDef::new(ProductAttributeValues::ValueNumber)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductAttributeValues::ValueBool)
                                .boolean()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductAttributeValues::ValueDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ProductAttributeValues::OptionId).uuid().null())
                        .col(
                            ColumnDef::new(ProductAttributeValues::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductAttributeValues::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_attribute_values_product_id")
                                .from(
                                    ProductAttributeValues::Table,
                                    ProductAttributeValues::ProductId,
                                )
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_attribute_values_category_attribute_id")
                                .from(
                                    ProductAttributeValues::Table,
                                    ProductAttributeValues::CategoryAttributeId,
                                )
                                .to(CategoryAttributes::Table, CategoryAttributes::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_attribute_values_option_id")
                                .from(
                                    ProductAttributeValues::Table,
                                    ProductAttributeValues::OptionId,
                                )
                                .to(AttributeOptions::Table, AttributeOptions::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            // Upsert key for setting attribute values.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_attribute_values_product_attribute")
                        .table(ProductAttributeValues::Table)
                        .col(ProductAttributeValues::ProductId)
                        .col(ProductAttributeValues::CategoryAttributeId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_attribute_values_category_attribute_id")
                        .table(ProductAttributeValues::Table)
                        .col(ProductAttributeValues::CategoryAttributeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductAttributeValues::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductAttributeValues {
        Table,
        Id,
        ProductId,
        CategoryAttributeId,
        ValueText,
        ValueNumber,
        ValueBool,
        ValueDate,
        OptionId,
        CreatedAt,
        UpdatedAt,
    }
}
