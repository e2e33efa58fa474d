use crate::{
    entities::{
        category, product, product_image, product_review, subcategory, Category, CategoryModel,
        Finish, Material, Product, ProductImage, ProductImageModel, ProductModel, ProductReview,
        Subcategory, SubcategoryModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    slug::{generate_sku, slugify},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;
const RELATED_PRODUCTS_LIMIT: u64 = 4;
const SKU_GENERATION_ATTEMPTS: u32 = 3;

/// Catalog queries and product administration.
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Filters applied to product listings. All fields combine with AND; slug
/// fields that match nothing yield an empty page rather than an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub material: Option<Material>,
    pub finish: Option<Finish>,
    pub color: Option<String>,
    pub is_featured: Option<bool>,
    pub is_bestseller: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub on_sale: Option<bool>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// One page of results plus pagination bookkeeping.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    fn empty(page: u64, per_page: u64) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            per_page,
            total_pages: 0,
        }
    }
}

/// Nested parent summary carried by product shapes. The count reflects the
/// parent's active products at read time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryRef {
    pub name: String,
    pub slug: String,
    pub products_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageView {
    pub id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub sort_order: i32,
}

impl From<ProductImageModel> for ImageView {
    fn from(model: ProductImageModel) -> Self {
        Self {
            id: model.id,
            image_url: model.image_url,
            alt_text: model.alt_text,
            is_primary: model.is_primary,
            sort_order: model.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewView {
    pub id: Uuid,
    pub customer_name: String,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Listing shape: the product row plus its primary image, parent names and
/// the approved-review aggregate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub short_description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub current_price: Decimal,
    pub is_on_sale: bool,
    pub discount_percentage: i32,
    pub category: CategoryRef,
    pub subcategory: CategoryRef,
    pub primary_image: Option<ImageView>,
    pub average_rating: f64,
    pub review_count: u64,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub is_low_stock: bool,
    pub is_out_of_stock: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub short_description: Option<String>,
    pub description: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub current_price: Decimal,
    pub is_on_sale: bool,
    pub discount_percentage: i32,
    pub stock_quantity: i32,
    pub is_low_stock: bool,
    pub is_out_of_stock: bool,
    pub material: Option<Material>,
    pub finish: Option<Finish>,
    pub dimensions_length: Option<Decimal>,
    pub dimensions_width: Option<Decimal>,
    pub dimensions_height: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub color: Option<String>,
    pub features: serde_json::Value,
    pub specifications: serde_json::Value,
    pub category: CategoryRef,
    pub subcategory: CategoryRef,
    pub images: Vec<ImageView>,
    pub reviews: Vec<ReviewView>,
    pub average_rating: f64,
    pub review_count: u64,
    pub related_products: Vec<ProductSummary>,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category_slug: String,
    pub subcategory_slug: String,
    #[validate(length(max = 300))]
    pub short_description: Option<String>,
    #[validate(length(min = 1))]
    pub description: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    pub material: Option<Material>,
    pub finish: Option<Finish>,
    pub dimensions_length: Option<Decimal>,
    pub dimensions_width: Option<Decimal>,
    pub dimensions_height: Option<Decimal>,
    pub weight: Option<Decimal>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_bestseller: bool,
    #[validate(length(max = 60))]
    pub meta_title: Option<String>,
    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_low_stock_threshold() -> i32 {
    5
}

struct RatingStats {
    average: f64,
    count: u64,
}

/// Average of the given ratings, rounded to one decimal place.
fn round_average(sum: i64, count: u64) -> f64 {
    (sum as f64 / count as f64 * 10.0).round() / 10.0
}

/// Primary image for a list of images already sorted by sort order: the
/// flagged one wins, otherwise the first in sort order.
fn pick_primary(images: &[ProductImageModel]) -> Option<&ProductImageModel> {
    images.iter().find(|i| i.is_primary).or_else(|| images.first())
}

fn parse_ordering(raw: &str) -> Result<(product::Column, Order), ServiceError> {
    let (field, order) = match raw.strip_prefix('-') {
        Some(field) => (field, Order::Desc),
        None => (raw, Order::Asc),
    };
    let column = match field {
        "price" => product::Column::Price,
        "created_at" => product::Column::CreatedAt,
        "name" => product::Column::Name,
        other => {
            return Err(ServiceError::ValidationError(format!(
                "Unsupported ordering field: {}",
                other
            )))
        }
    };
    Ok((column, order))
}

impl ProductCatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists active products matching the filter, one page at a time.
    /// `page` is 1-based; `per_page` is clamped to [`MAX_PER_PAGE`].
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<ProductSummary>, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);

        let mut query = Product::find().filter(product::Column::IsActive.eq(true));

        if let Some(slug) = &filter.category {
            match self.find_category(slug).await? {
                Some(parent) => {
                    query = query.filter(product::Column::CategoryId.eq(parent.id));
                }
                None => return Ok(Page::empty(page, per_page)),
            }
        }

        if let Some(slug) = &filter.subcategory {
            match self.find_subcategory(slug, filter.category.as_deref()).await? {
                Some(parent) => {
                    query = query.filter(product::Column::SubcategoryId.eq(parent.id));
                }
                None => return Ok(Page::empty(page, per_page)),
            }
        }

        if let Some(material) = filter.material {
            query = query.filter(product::Column::Material.eq(material));
        }
        if let Some(finish) = filter.finish {
            query = query.filter(product::Column::Finish.eq(finish));
        }
        if let Some(color) = &filter.color {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    product::Entity,
                    product::Column::Color,
                ))))
                .eq(color.to_lowercase()),
            );
        }
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(product::Column::IsFeatured.eq(is_featured));
        }
        if let Some(is_bestseller) = filter.is_bestseller {
            query = query.filter(product::Column::IsBestseller.eq(is_bestseller));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(product::Column::Price.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(product::Column::Price.lte(max_price));
        }
        if filter.on_sale == Some(true) {
            query = query.filter(
                Condition::all()
                    .add(product::Column::SalePrice.is_not_null())
                    .add(
                        Expr::col((product::Entity, product::Column::SalePrice))
                            .lt(Expr::col((product::Entity, product::Column::Price))),
                    ),
            );
        }
        if filter.in_stock == Some(true) {
            query = query.filter(product::Column::StockQuantity.gt(0));
        }

        if let Some(q) = filter.search.as_deref().map(str::trim) {
            if !q.is_empty() {
                let pattern = format!("%{}%", q.to_lowercase());
                let text_match = |entity_col: (product::Entity, product::Column)| {
                    Expr::expr(Func::lower(Expr::col(entity_col))).like(pattern.clone())
                };
                query = query
                    .join(JoinType::InnerJoin, product::Relation::Category.def())
                    .join(JoinType::InnerJoin, product::Relation::Subcategory.def())
                    .filter(
                        Condition::any()
                            .add(text_match((product::Entity, product::Column::Name)))
                            .add(text_match((product::Entity, product::Column::Description)))
                            .add(text_match((
                                product::Entity,
                                product::Column::ShortDescription,
                            )))
                            .add(text_match((product::Entity, product::Column::Sku)))
                            .add(
                                Expr::expr(Func::lower(Expr::col((
                                    category::Entity,
                                    category::Column::Name,
                                ))))
                                .like(pattern.clone()),
                            )
                            .add(
                                Expr::expr(Func::lower(Expr::col((
                                    subcategory::Entity,
                                    subcategory::Column::Name,
                                ))))
                                .like(pattern.clone()),
                            ),
                    );
            }
        }

        let ordering = filter.ordering.as_deref().unwrap_or("-created_at");
        let (column, order) = parse_ordering(ordering)?;
        query = query
            .order_by(column, order)
            .order_by(product::Column::Id, Order::Asc);

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;
        let products = paginator.fetch_page(page - 1).await?;

        let items = self.assemble_summaries(products).await?;
        Ok(Page {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Case-insensitive search across product text, SKU and parent names.
    /// An empty query is rejected.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        q: &str,
        page: u64,
        per_page: u64,
    ) -> Result<Page<ProductSummary>, ServiceError> {
        if q.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Search query must not be empty".to_string(),
            ));
        }
        let filter = ProductFilter {
            search: Some(q.to_string()),
            ..ProductFilter::default()
        };
        self.list_products(&filter, page, per_page).await
    }

    /// Full product detail by slug: images, approved reviews, rating
    /// aggregate and up to four related products from the same subcategory.
    #[instrument(skip(self))]
    pub async fn get_product_detail(&self, slug: &str) -> Result<ProductDetail, ServiceError> {
        let product = Product::find()
            .filter(product::Column::Slug.eq(slug))
            .filter(product::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", slug)))?;

        let category = Category::find_by_id(product.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Product {} references a missing category",
                    product.id
                ))
            })?;
        let subcategory = Subcategory::find_by_id(product.subcategory_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Product {} references a missing subcategory",
                    product.id
                ))
            })?;

        let images = ProductImage::find()
            .filter(product_image::Column::ProductId.eq(product.id))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_asc(product_image::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let reviews = ProductReview::find()
            .filter(product_review::Column::ProductId.eq(product.id))
            .filter(product_review::Column::IsApproved.eq(true))
            .order_by_desc(product_review::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let review_count = reviews.len() as u64;
        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
            round_average(sum, review_count)
        };

        let category_counts = self
            .active_product_counts(product::Column::CategoryId, &[product.category_id])
            .await?;
        let subcategory_counts = self
            .active_product_counts(product::Column::SubcategoryId, &[product.subcategory_id])
            .await?;

        let related = Product::find()
            .filter(product::Column::SubcategoryId.eq(product.subcategory_id))
            .filter(product::Column::IsActive.eq(true))
            .filter(product::Column::Id.ne(product.id))
            .order_by_desc(product::Column::CreatedAt)
            .limit(RELATED_PRODUCTS_LIMIT)
            .all(&*self.db)
            .await?;
        let related_products = self.assemble_summaries(related).await?;

        Ok(ProductDetail {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            sku: product.sku.clone(),
            short_description: product.short_description.clone(),
            description: product.description.clone(),
            current_price: product.current_price(),
            is_on_sale: product.is_on_sale(),
            discount_percentage: product.discount_percentage(),
            is_low_stock: product.is_low_stock(),
            is_out_of_stock: product.is_out_of_stock(),
            price: product.price,
            sale_price: product.sale_price,
            stock_quantity: product.stock_quantity,
            material: product.material,
            finish: product.finish,
            dimensions_length: product.dimensions_length,
            dimensions_width: product.dimensions_width,
            dimensions_height: product.dimensions_height,
            weight: product.weight,
            color: product.color.clone(),
            features: product.features.clone(),
            specifications: product.specifications.clone(),
            category: CategoryRef {
                name: category.name,
                slug: category.slug,
                products_count: category_counts
                    .get(&product.category_id)
                    .copied()
                    .unwrap_or(0),
            },
            subcategory: CategoryRef {
                name: subcategory.name,
                slug: subcategory.slug,
                products_count: subcategory_counts
                    .get(&product.subcategory_id)
                    .copied()
                    .unwrap_or(0),
            },
            images: images.into_iter().map(ImageView::from).collect(),
            reviews: reviews
                .into_iter()
                .map(|r| ReviewView {
                    id: r.id,
                    customer_name: r.customer_name,
                    rating: r.rating,
                    title: r.title,
                    comment: r.comment,
                    created_at: r.created_at,
                })
                .collect(),
            average_rating,
            review_count,
            related_products,
            is_featured: product.is_featured,
            is_bestseller: product.is_bestseller,
            meta_title: product.meta_title,
            meta_description: product.meta_description,
            created_at: product.created_at,
        })
    }

    /// Creates a product under an existing category/subcategory pair. The
    /// slug is derived from the name and the SKU is generated.
    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        input.validate()?;

        if input.price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price must be positive".to_string(),
            ));
        }
        if let Some(sale_price) = input.sale_price {
            if sale_price <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Sale price must be positive".to_string(),
                ));
            }
        }
        if input.stock_quantity < 0 {
            return Err(ServiceError::ValidationError(
                "Stock quantity must not be negative".to_string(),
            ));
        }

        let category = self.find_category(&input.category_slug).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Category {} not found", input.category_slug))
        })?;
        let subcategory = Subcategory::find()
            .filter(subcategory::Column::CategoryId.eq(category.id))
            .filter(subcategory::Column::Slug.eq(input.subcategory_slug.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Subcategory {} not found in category {}",
                    input.subcategory_slug, input.category_slug
                ))
            })?;

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(ServiceError::ValidationError(
                "Product name must contain at least one alphanumeric character".to_string(),
            ));
        }
        let existing = Product::find()
            .filter(product::Column::Slug.eq(slug.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "A product with slug {} already exists",
                slug
            )));
        }

        let sku = self.generate_unique_sku().await?;
        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(slug),
            sku: Set(sku),
            category_id: Set(category.id),
            subcategory_id: Set(subcategory.id),
            short_description: Set(input.short_description),
            description: Set(input.description),
            price: Set(input.price),
            sale_price: Set(input.sale_price),
            cost_price: Set(input.cost_price),
            stock_quantity: Set(input.stock_quantity),
            low_stock_threshold: Set(input.low_stock_threshold),
            material: Set(input.material),
            finish: Set(input.finish),
            dimensions_length: Set(input.dimensions_length),
            dimensions_width: Set(input.dimensions_width),
            dimensions_height: Set(input.dimensions_height),
            weight: Set(input.weight),
            color: Set(input.color),
            features: Set(serde_json::Value::from(input.features)),
            specifications: Set(serde_json::Value::Object(input.specifications)),
            is_active: Set(input.is_active),
            is_featured: Set(input.is_featured),
            is_bestseller: Set(input.is_bestseller),
            meta_title: Set(input.meta_title),
            meta_description: Set(input.meta_description),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let product = product.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;

        info!(product_id = %product.id, sku = %product.sku, "Created product");
        Ok(product)
    }

    async fn find_category(&self, slug: &str) -> Result<Option<CategoryModel>, ServiceError> {
        let category = Category::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;
        Ok(category)
    }

    /// Subcategory slugs are unique per category, so the parent slug narrows
    /// the lookup when the caller supplied one.
    async fn find_subcategory(
        &self,
        slug: &str,
        category_slug: Option<&str>,
    ) -> Result<Option<SubcategoryModel>, ServiceError> {
        let mut query = Subcategory::find()
            .filter(subcategory::Column::Slug.eq(slug))
            .filter(subcategory::Column::IsActive.eq(true));
        if let Some(category_slug) = category_slug {
            match self.find_category(category_slug).await? {
                Some(parent) => {
                    query = query.filter(subcategory::Column::CategoryId.eq(parent.id));
                }
                None => return Ok(None),
            }
        }
        Ok(query.one(&*self.db).await?)
    }

    async fn generate_unique_sku(&self) -> Result<String, ServiceError> {
        for _ in 0..SKU_GENERATION_ATTEMPTS {
            let sku = generate_sku();
            let taken = Product::find()
                .filter(product::Column::Sku.eq(sku.as_str()))
                .one(&*self.db)
                .await?
                .is_some();
            if !taken {
                return Ok(sku);
            }
        }
        Err(ServiceError::InternalError(
            "Could not generate a unique SKU".to_string(),
        ))
    }

    /// Builds listing summaries for a batch of product rows with three
    /// follow-up queries: parents, images and approved-review stats.
    async fn assemble_summaries(
        &self,
        products: Vec<ProductModel>,
    ) -> Result<Vec<ProductSummary>, ServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let category_ids: Vec<Uuid> = products.iter().map(|p| p.category_id).collect();
        let subcategory_ids: Vec<Uuid> = products.iter().map(|p| p.subcategory_id).collect();

        let categories: HashMap<Uuid, CategoryModel> = Category::find()
            .filter(category::Column::Id.is_in(category_ids.clone()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let subcategories: HashMap<Uuid, SubcategoryModel> = Subcategory::find()
            .filter(subcategory::Column::Id.is_in(subcategory_ids.clone()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let category_counts = self
            .active_product_counts(product::Column::CategoryId, &category_ids)
            .await?;
        let subcategory_counts = self
            .active_product_counts(product::Column::SubcategoryId, &subcategory_ids)
            .await?;

        let mut images_by_product: HashMap<Uuid, Vec<ProductImageModel>> = HashMap::new();
        let images = ProductImage::find()
            .filter(product_image::Column::ProductId.is_in(product_ids.clone()))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_asc(product_image::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        for image in images {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push(image);
        }

        let ratings = self.rating_stats(&product_ids).await?;

        let mut summaries = Vec::with_capacity(products.len());
        for product in products {
            let category = categories.get(&product.category_id).ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Product {} references a missing category",
                    product.id
                ))
            })?;
            let subcategory = subcategories.get(&product.subcategory_id).ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Product {} references a missing subcategory",
                    product.id
                ))
            })?;

            let primary_image = images_by_product
                .get(&product.id)
                .and_then(|images| pick_primary(images))
                .cloned()
                .map(ImageView::from);
            let stats = ratings.get(&product.id);

            summaries.push(ProductSummary {
                id: product.id,
                name: product.name.clone(),
                slug: product.slug.clone(),
                sku: product.sku.clone(),
                short_description: product.short_description.clone(),
                current_price: product.current_price(),
                is_on_sale: product.is_on_sale(),
                discount_percentage: product.discount_percentage(),
                is_low_stock: product.is_low_stock(),
                is_out_of_stock: product.is_out_of_stock(),
                price: product.price,
                sale_price: product.sale_price,
                category: CategoryRef {
                    name: category.name.clone(),
                    slug: category.slug.clone(),
                    products_count: category_counts
                        .get(&product.category_id)
                        .copied()
                        .unwrap_or(0),
                },
                subcategory: CategoryRef {
                    name: subcategory.name.clone(),
                    slug: subcategory.slug.clone(),
                    products_count: subcategory_counts
                        .get(&product.subcategory_id)
                        .copied()
                        .unwrap_or(0),
                },
                primary_image,
                average_rating: stats.map(|s| s.average).unwrap_or(0.0),
                review_count: stats.map(|s| s.count).unwrap_or(0),
                is_featured: product.is_featured,
                is_bestseller: product.is_bestseller,
            });
        }
        Ok(summaries)
    }

    /// Approved-review counts and averages per product, computed in-process
    /// so the arithmetic does not depend on the backend's AVG type.
    async fn rating_stats(
        &self,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingStats>, ServiceError> {
        let rows: Vec<(Uuid, i32)> = ProductReview::find()
            .select_only()
            .column(product_review::Column::ProductId)
            .column(product_review::Column::Rating)
            .filter(product_review::Column::ProductId.is_in(product_ids.to_vec()))
            .filter(product_review::Column::IsApproved.eq(true))
            .into_tuple()
            .all(&*self.db)
            .await?;

        let mut sums: HashMap<Uuid, (i64, u64)> = HashMap::new();
        for (product_id, rating) in rows {
            let entry = sums.entry(product_id).or_insert((0, 0));
            entry.0 += i64::from(rating);
            entry.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(product_id, (sum, count))| {
                (
                    product_id,
                    RatingStats {
                        average: round_average(sum, count),
                        count,
                    },
                )
            })
            .collect())
    }

    /// Active products per parent, grouped in one query. `column` is the FK
    /// column to group by (category or subcategory id).
    async fn active_product_counts(
        &self,
        column: product::Column,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, ServiceError> {
        let rows: Vec<(Uuid, i64)> = Product::find()
            .select_only()
            .column(column)
            .column_as(product::Column::Id.count(), "count")
            .filter(column.is_in(ids.to_vec()))
            .filter(product::Column::IsActive.eq(true))
            .group_by(column)
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(|(id, n)| (id, n as u64)).collect())
    }
}
