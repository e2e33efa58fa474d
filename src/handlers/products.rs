use crate::handlers::common::{
    created_response, default_page, default_per_page, map_service_error, success_response,
    validate_input, PaginationParams, Query,
};
use crate::{
    entities::{Finish, Material, ProductModel},
    errors::ApiError,
    services::products::{CreateProductInput, Page, ProductDetail, ProductFilter, ProductSummary},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/featured", get(list_featured))
        .route("/bestsellers", get(list_bestsellers))
        .route("/on-sale", get(list_on_sale))
        .route("/search", get(search_products))
        .route("/:slug", get(get_product))
}

/// Query string accepted by the product listing. All filters are optional
/// and combine with AND.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Category slug
    pub category: Option<String>,
    /// Subcategory slug
    pub subcategory: Option<String>,
    pub material: Option<Material>,
    pub finish: Option<Finish>,
    /// Case-insensitive color match
    pub color: Option<String>,
    pub is_featured: Option<bool>,
    pub is_bestseller: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Only products whose sale price undercuts the regular price
    pub on_sale: Option<bool>,
    /// Only products with stock on hand
    pub in_stock: Option<bool>,
    /// Free-text search across name, descriptions, SKU and parent names
    pub search: Option<String>,
    /// `price`, `created_at` or `name`, prefixed with `-` for descending
    pub ordering: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

impl ProductListQuery {
    pub(crate) fn into_filter(self) -> (ProductFilter, u64, u64) {
        let filter = ProductFilter {
            category: self.category,
            subcategory: self.subcategory,
            material: self.material,
            finish: self.finish,
            color: self.color,
            is_featured: self.is_featured,
            is_bestseller: self.is_bestseller,
            min_price: self.min_price,
            max_price: self.max_price,
            on_sale: self.on_sale,
            in_stock: self.in_stock,
            search: self.search,
            ordering: self.ordering,
        };
        (filter, self.page, self.per_page)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Search terms; must not be empty
    pub q: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

/// Admin-facing view of a freshly created product row.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub current_price: Decimal,
    pub is_on_sale: bool,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductModel> for ProductResponse {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            current_price: model.current_price(),
            is_on_sale: model.is_on_sale(),
            name: model.name,
            slug: model.slug,
            sku: model.sku,
            price: model.price,
            sale_price: model.sale_price,
            stock_quantity: model.stock_quantity,
            is_active: model.is_active,
            is_featured: model.is_featured,
            is_bestseller: model.is_bestseller,
            created_at: model.created_at,
        }
    }
}

/// List active products with filtering, ordering and pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of matching products", body = Page<ProductSummary>),
        (status = 400, description = "Unsupported ordering field", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (filter, page, per_page) = query.into_filter();
    let products = state
        .services
        .products
        .list_products(&filter, page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// List featured products
#[utoipa::path(
    get,
    path = "/api/v1/products/featured",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of featured products", body = Page<ProductSummary>)
    ),
    tag = "Products"
)]
pub async fn list_featured(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = ProductFilter {
        is_featured: Some(true),
        ..ProductFilter::default()
    };
    let products = state
        .services
        .products
        .list_products(&filter, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// List bestselling products
#[utoipa::path(
    get,
    path = "/api/v1/products/bestsellers",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of bestsellers", body = Page<ProductSummary>)
    ),
    tag = "Products"
)]
pub async fn list_bestsellers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = ProductFilter {
        is_bestseller: Some(true),
        ..ProductFilter::default()
    };
    let products = state
        .services
        .products
        .list_products(&filter, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// List discounted products
#[utoipa::path(
    get,
    path = "/api/v1/products/on-sale",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of discounted products", body = Page<ProductSummary>)
    ),
    tag = "Products"
)]
pub async fn list_on_sale(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = ProductFilter {
        on_sale: Some(true),
        ..ProductFilter::default()
    };
    let products = state
        .services
        .products
        .list_products(&filter, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Search products by free text
#[utoipa::path(
    get,
    path = "/api/v1/products/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "One page of search hits", body = Page<ProductSummary>),
        (status = 400, description = "Missing or empty query", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let q = query.q.unwrap_or_default();
    let products = state
        .services
        .products
        .search_products(&q, query.page, query.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Get full product detail by slug
#[utoipa::path(
    get,
    path = "/api/v1/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product detail with images, reviews and related products", body = ProductDetail),
        (status = 404, description = "Unknown or inactive product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let detail = state
        .services
        .products
        .get_product_detail(&slug)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid payload or duplicate slug", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown category or subcategory", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .create_product(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(ProductResponse::from(product)))
}
