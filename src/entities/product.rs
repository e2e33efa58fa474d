use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Furniture products with pricing, inventory and specification attributes
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub category_id: Uuid,
    pub subcategory_id: Uuid,
    pub short_description: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub material: Option<Material>,
    pub finish: Option<Finish>,
    pub dimensions_length: Option<Decimal>,
    pub dimensions_width: Option<Decimal>,
    pub dimensions_height: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub color: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub features: Json,
    #[sea_orm(column_type = "Json")]
    pub specifications: Json,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::subcategory::Entity",
        from = "Column::SubcategoryId",
        to = "super::subcategory::Column::Id"
    )]
    Subcategory,
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::product_review::Entity")]
    Reviews,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::subcategory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategory.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::product_review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A product is on sale iff a sale price is set strictly below the base price.
    pub fn is_on_sale(&self) -> bool {
        matches!(self.sale_price, Some(sale) if sale < self.price)
    }

    /// Sale price when on sale, base price otherwise.
    pub fn current_price(&self) -> Decimal {
        if self.is_on_sale() {
            self.sale_price.unwrap_or(self.price)
        } else {
            self.price
        }
    }

    /// Whole-percent discount, floored. 0 when not on sale.
    pub fn discount_percentage(&self) -> i32 {
        match self.sale_price {
            Some(sale) if sale < self.price => ((self.price - sale) * Decimal::from(100)
                / self.price)
                .floor()
                .to_i32()
                .unwrap_or(0),
            _ => 0,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == 0
    }
}

/// Primary construction material
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[sea_orm(string_value = "wood")]
    Wood,
    #[sea_orm(string_value = "metal")]
    Metal,
    #[sea_orm(string_value = "plastic")]
    Plastic,
    #[sea_orm(string_value = "fabric")]
    Fabric,
    #[sea_orm(string_value = "leather")]
    Leather,
    #[sea_orm(string_value = "glass")]
    Glass,
    #[sea_orm(string_value = "marble")]
    Marble,
    #[sea_orm(string_value = "mixed")]
    Mixed,
}

/// Surface finish
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    #[sea_orm(string_value = "natural")]
    Natural,
    #[sea_orm(string_value = "painted")]
    Painted,
    #[sea_orm(string_value = "stained")]
    Stained,
    #[sea_orm(string_value = "varnished")]
    Varnished,
    #[sea_orm(string_value = "polished")]
    Polished,
    #[sea_orm(string_value = "matte")]
    Matte,
    #[sea_orm(string_value = "glossy")]
    Glossy,
}
