use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, Query,
};
use crate::handlers::products::ProductListQuery;
use crate::{
    entities::{CategoryModel, SubcategoryModel},
    errors::ApiError,
    services::categories::CreateCategoryInput,
    services::products::{Page, ProductSummary},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:slug", get(get_category))
        .route("/:slug/subcategories", get(list_subcategories))
        .route("/:slug/products", get(list_category_products))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubcategoryResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SubcategoryModel> for SubcategoryResponse {
    fn from(model: SubcategoryModel) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

/// List active categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Active categories ordered by name", body = [CategoryResponse])
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let categories = state
        .services
        .categories
        .list_active()
        .await
        .map_err(map_service_error)?;
    let payload: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();
    Ok(success_response(payload))
}

/// Get one active category by slug
#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Unknown or inactive category", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .get_by_slug(&slug)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(CategoryResponse::from(category)))
}

/// List a category's active subcategories
#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}/subcategories",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Active subcategories ordered by name", body = [SubcategoryResponse]),
        (status = 404, description = "Unknown or inactive category", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let subcategories = state
        .services
        .categories
        .list_subcategories(&slug)
        .await
        .map_err(map_service_error)?;
    let payload: Vec<SubcategoryResponse> = subcategories.into_iter().map(Into::into).collect();
    Ok(success_response(payload))
}

/// List a category's active products, with the usual filters
#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}/products",
    params(("slug" = String, Path, description = "Category slug"), ProductListQuery),
    responses(
        (status = 200, description = "One page of products in the category", body = Page<ProductSummary>),
        (status = 404, description = "Unknown or inactive category", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    // Resolve the parent first so an unknown category is a 404, not an
    // empty page.
    state
        .services
        .categories
        .get_by_slug(&slug)
        .await
        .map_err(map_service_error)?;

    let (mut filter, page, per_page) = query.into_filter();
    filter.category = Some(slug);
    let products = state
        .services
        .products
        .list_products(&filter, page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let category = state
        .services
        .categories
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(CategoryResponse::from(category)))
}
