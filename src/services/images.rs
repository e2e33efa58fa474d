use crate::{
    entities::{product, product_image, Product, ProductImage, ProductImageModel, ProductModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Product image management. A product has at most one primary image;
/// promotions clear the previous flag in the same transaction.
#[derive(Clone)]
pub struct ImageService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct AddImageInput {
    #[validate(url)]
    pub image_url: String,
    #[validate(length(max = 200))]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl ImageService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists a product's images in display order, optionally restricted to
    /// primary or non-primary images.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        product_slug: &str,
        is_primary: Option<bool>,
    ) -> Result<Vec<ProductImageModel>, ServiceError> {
        let product = self.get_product(product_slug).await?;

        let mut query = ProductImage::find()
            .filter(product_image::Column::ProductId.eq(product.id))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_asc(product_image::Column::CreatedAt);
        if let Some(is_primary) = is_primary {
            query = query.filter(product_image::Column::IsPrimary.eq(is_primary));
        }

        Ok(query.all(&*self.db).await?)
    }

    /// Attaches an image to a product. When flagged primary, the previous
    /// primary is demoted atomically with the insert.
    #[instrument(skip(self, input))]
    pub async fn add(
        &self,
        product_slug: &str,
        input: AddImageInput,
    ) -> Result<ProductImageModel, ServiceError> {
        input.validate()?;
        let product = self.get_product(product_slug).await?;

        let txn = self.db.begin().await?;
        if input.is_primary {
            Self::clear_primary(&txn, product.id).await?;
        }
        let image = product_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            image_url: Set(input.image_url),
            alt_text: Set(input.alt_text),
            is_primary: Set(input.is_primary),
            sort_order: Set(input.sort_order),
            created_at: Set(Utc::now()),
        };
        let image = image.insert(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductImageAdded {
                product_id: product.id,
                image_id: image.id,
            })
            .await;

        info!(product_id = %product.id, image_id = %image.id, "Added product image");
        Ok(image)
    }

    /// Promotes an existing image to primary, demoting any other.
    #[instrument(skip(self))]
    pub async fn set_primary(
        &self,
        product_slug: &str,
        image_id: Uuid,
    ) -> Result<ProductImageModel, ServiceError> {
        let product = self.get_product(product_slug).await?;

        let image = ProductImage::find_by_id(image_id)
            .filter(product_image::Column::ProductId.eq(product.id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Image {} not found on product {}",
                    image_id, product_slug
                ))
            })?;

        let txn = self.db.begin().await?;
        Self::clear_primary(&txn, product.id).await?;
        let mut active: product_image::ActiveModel = image.into();
        active.is_primary = Set(true);
        let image = active.update(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::PrimaryImageChanged {
                product_id: product.id,
                image_id: image.id,
            })
            .await;

        info!(product_id = %product.id, image_id = %image.id, "Changed primary image");
        Ok(image)
    }

    async fn clear_primary(
        txn: &sea_orm::DatabaseTransaction,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        ProductImage::update_many()
            .col_expr(product_image::Column::IsPrimary, Expr::value(false))
            .filter(product_image::Column::ProductId.eq(product_id))
            .filter(product_image::Column::IsPrimary.eq(true))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn get_product(&self, slug: &str) -> Result<ProductModel, ServiceError> {
        Product::find()
            .filter(product::Column::Slug.eq(slug))
            .filter(product::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", slug)))
    }
}
