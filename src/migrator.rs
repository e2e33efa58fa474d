//! Inline schema migrations for the catalog tables.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_categories_table::Migration),
            Box::new(m20240101_000002_create_subcategories_table::Migration),
            Box::new(m20240101_000003_create_products_table::Migration),
            Box::new(m20240101_000004_create_product_images_table::Migration),
            Box::new(m20240101_000005_create_product_reviews_table::Migration),
        ]
    }
}

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
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Slug)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Categories::Description).text().null())
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
    pub enum Categories {
        Table,
        Id,
        Name,
        Slug,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_subcategories_table {
    use super::m20240101_000001_create_categories_table::Categories;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_subcategories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Subcategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Subcategories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Subcategories::CategoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(Subcategories::Name)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Subcategories::Slug)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Subcategories::Description).text().null())
                        .col(
                            ColumnDef::new(Subcategories::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Subcategories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Subcategories::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_subcategories_category")
                                .from(Subcategories::Table, Subcategories::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Name is unique within its parent category only
            manager
                .create_index(
                    Index::create()
                        .name("idx_subcategories_category_name")
                        .table(Subcategories::Table)
                        .col(Subcategories::CategoryId)
                        .col(Subcategories::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_subcategories_slug")
                        .table(Subcategories::Table)
                        .col(Subcategories::Slug)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Subcategories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Subcategories {
        Table,
        Id,
        CategoryId,
        Name,
        Slug,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_products_table {
    use super::m20240101_000001_create_categories_table::Categories;
    use super::m20240101_000002_create_subcategories_table::Subcategories;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_products_table"
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
                        .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                        .col(
                            ColumnDef::new(Products::Slug)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Sku)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Products::SubcategoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(Products::ShortDescription)
                                .string_len(300)
                                .null(),
                        )
                        .col(ColumnDef::new(Products::Description).text().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::SalePrice).decimal_len(10, 2).null())
                        .col(ColumnDef::new(Products::CostPrice).decimal_len(10, 2).null())
                        .col(
                            ColumnDef::new(Products::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::LowStockThreshold)
                                .integer()
                                .not_null()
                                .default(5),
                        )
                        .col(ColumnDef::new(Products::Material).string_len(20).null())
                        .col(ColumnDef::new(Products::Finish).string_len(20).null())
                        .col(
                            ColumnDef::new(Products::DimensionsLength)
                                .decimal_len(8, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Products::DimensionsWidth)
                                .decimal_len(8, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Products::DimensionsHeight)
                                .decimal_len(8, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(Products::Weight).decimal_len(8, 2).null())
                        .col(ColumnDef::new(Products::Color).string_len(50).null())
                        .col(ColumnDef::new(Products::Features).json().not_null())
                        .col(ColumnDef::new(Products::Specifications).json().not_null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::IsFeatured)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::IsBestseller)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Products::MetaTitle).string_len(60).null())
                        .col(
                            ColumnDef::new(Products::MetaDescription)
                                .string_len(160)
                                .null(),
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
                                .name("fk_products_category")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_subcategory")
                                .from(Products::Table, Products::SubcategoryId)
                                .to(Subcategories::Table, Subcategories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_category")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_subcategory")
                        .table(Products::Table)
                        .col(Products::SubcategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
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
    pub enum Products {
        Table,
        Id,
        Name,
        Slug,
        Sku,
        CategoryId,
        SubcategoryId,
        ShortDescription,
        Description,
        Price,
        SalePrice,
        CostPrice,
        StockQuantity,
        LowStockThreshold,
        Material,
        Finish,
        DimensionsLength,
        DimensionsWidth,
        DimensionsHeight,
        Weight,
        Color,
        Features,
        Specifications,
        IsActive,
        IsFeatured,
        IsBestseller,
        MetaTitle,
        MetaDescription,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_product_images_table {
    use super::m20240101_000003_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_product_images_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductImages::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductImages::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductImages::ImageUrl)
                                .string_len(500)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductImages::AltText)
                                .string_len(200)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductImages::IsPrimary)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ProductImages::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductImages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_images_product")
                                .from(ProductImages::Table, ProductImages::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_images_product")
                        .table(ProductImages::Table)
                        .col(ProductImages::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductImages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ProductImages {
        Table,
        Id,
        ProductId,
        ImageUrl,
        AltText,
        IsPrimary,
        SortOrder,
        CreatedAt,
    }
}

mod m20240101_000005_create_product_reviews_table {
    use super::m20240101_000003_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_product_reviews_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductReviews::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductReviews::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductReviews::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductReviews::CustomerName)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductReviews::Email)
                                .string_len(254)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductReviews::Rating).integer().not_null())
                        .col(
                            ColumnDef::new(ProductReviews::Title)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductReviews::Comment).text().not_null())
                        .col(
                            ColumnDef::new(ProductReviews::IsApproved)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ProductReviews::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_reviews_product")
                                .from(ProductReviews::Table, ProductReviews::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_reviews_product")
                        .table(ProductReviews::Table)
                        .col(ProductReviews::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductReviews::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ProductReviews {
        Table,
        Id,
        ProductId,
        CustomerName,
        Email,
        Rating,
        Title,
        Comment,
        IsApproved,
        CreatedAt,
    }
}
