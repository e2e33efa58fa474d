use crate::handlers::categories::SubcategoryResponse;
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, Query,
};
use crate::handlers::products::ProductListQuery;
use crate::{
    errors::ApiError,
    services::products::{Page, ProductSummary},
    services::subcategories::CreateSubcategoryInput,
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Creates the router for subcategory endpoints. Detail routes carry the
/// parent category slug because subcategory slugs are only unique per
/// category.
pub fn subcategories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_subcategories).post(create_subcategory))
        .route("/:category_slug/:slug", get(get_subcategory))
        .route(
            "/:category_slug/:slug/products",
            get(list_subcategory_products),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubcategoryListQuery {
    /// Restrict to one parent category by slug
    pub category: Option<String>,
}

/// List active subcategories across all categories
#[utoipa::path(
    get,
    path = "/api/v1/subcategories",
    params(SubcategoryListQuery),
    responses(
        (status = 200, description = "Active subcategories ordered by name", body = [SubcategoryResponse]),
        (status = 404, description = "Unknown category filter", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategories"
)]
pub async fn list_all_subcategories(
    State(state): State<AppState>,
    Query(query): Query<SubcategoryListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let subcategories = state
        .services
        .subcategories
        .list_active(query.category.as_deref())
        .await
        .map_err(map_service_error)?;
    let payload: Vec<SubcategoryResponse> = subcategories.into_iter().map(Into::into).collect();
    Ok(success_response(payload))
}

/// List a subcategory's active products, with the usual filters
#[utoipa::path(
    get,
    path = "/api/v1/subcategories/{category_slug}/{slug}/products",
    params(
        ("category_slug" = String, Path, description = "Parent category slug"),
        ("slug" = String, Path, description = "Subcategory slug"),
        ProductListQuery
    ),
    responses(
        (status = 200, description = "One page of products in the subcategory", body = Page<ProductSummary>),
        (status = 404, description = "Unknown or inactive subcategory", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategories"
)]
pub async fn list_subcategory_products(
    State(state): State<AppState>,
    Path((category_slug, slug)): Path<(String, String)>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .subcategories
        .get_by_slug(&category_slug, &slug)
        .await
        .map_err(map_service_error)?;

    let (mut filter, page, per_page) = query.into_filter();
    filter.category = Some(category_slug);
    filter.subcategory = Some(slug);
    let products = state
        .services
        .products
        .list_products(&filter, page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Get one active subcategory by its parent's slug and its own
#[utoipa::path(
    get,
    path = "/api/v1/subcategories/{category_slug}/{slug}",
    params(
        ("category_slug" = String, Path, description = "Parent category slug"),
        ("slug" = String, Path, description = "Subcategory slug")
    ),
    responses(
        (status = 200, description = "Subcategory found", body = SubcategoryResponse),
        (status = 404, description = "Unknown or inactive subcategory", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategories"
)]
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path((category_slug, slug)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let subcategory = state
        .services
        .subcategories
        .get_by_slug(&category_slug, &slug)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(SubcategoryResponse::from(subcategory)))
}

/// Create a subcategory under an existing category
#[utoipa::path(
    post,
    path = "/api/v1/subcategories",
    request_body = CreateSubcategoryInput,
    responses(
        (status = 201, description = "Subcategory created", body = SubcategoryResponse),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown parent category", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategories"
)]
pub async fn create_subcategory(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubcategoryInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let subcategory = state
        .services
        .subcategories
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(SubcategoryResponse::from(subcategory)))
}
