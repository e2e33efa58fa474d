use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, Query,
};
use crate::{
    errors::ApiError,
    services::images::AddImageInput,
    services::products::ImageView,
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Creates the router for product image endpoints, nested under
/// `/products/:slug`.
pub fn images_routes() -> Router<AppState> {
    Router::new()
        .route("/:slug/images", get(list_images).post(add_image))
        .route("/:slug/images/:image_id/primary", put(set_primary_image))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ImageListQuery {
    /// Restrict to primary (`true`) or secondary (`false`) images
    pub is_primary: Option<bool>,
}

/// List a product's images in display order
#[utoipa::path(
    get,
    path = "/api/v1/products/{slug}/images",
    params(("slug" = String, Path, description = "Product slug"), ImageListQuery),
    responses(
        (status = 200, description = "Images ordered by sort order", body = [ImageView]),
        (status = 404, description = "Unknown or inactive product", body = crate::errors::ErrorResponse)
    ),
    tag = "Images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ImageListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let images = state
        .services
        .images
        .list(&slug, query.is_primary)
        .await
        .map_err(map_service_error)?;
    let payload: Vec<ImageView> = images.into_iter().map(Into::into).collect();
    Ok(success_response(payload))
}

/// Attach an image to a product
#[utoipa::path(
    post,
    path = "/api/v1/products/{slug}/images",
    params(("slug" = String, Path, description = "Product slug")),
    request_body = AddImageInput,
    responses(
        (status = 201, description = "Image attached", body = ImageView),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown or inactive product", body = crate::errors::ErrorResponse)
    ),
    tag = "Images"
)]
pub async fn add_image(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<AddImageInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let image = state
        .services
        .images
        .add(&slug, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(ImageView::from(image)))
}

/// Promote an image to primary
#[utoipa::path(
    put,
    path = "/api/v1/products/{slug}/images/{image_id}/primary",
    params(
        ("slug" = String, Path, description = "Product slug"),
        ("image_id" = Uuid, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "Image promoted", body = ImageView),
        (status = 404, description = "Unknown product or image", body = crate::errors::ErrorResponse)
    ),
    tag = "Images"
)]
pub async fn set_primary_image(
    State(state): State<AppState>,
    Path((slug, image_id)): Path<(String, Uuid)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let image = state
        .services
        .images
        .set_primary(&slug, image_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ImageView::from(image)))
}
