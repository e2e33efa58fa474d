use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, PaginationParams, Query,
};
use crate::{
    entities::ProductReviewModel,
    errors::ApiError,
    services::products::{Page, ReviewView},
    services::reviews::{ModerateReviewsInput, SubmitReviewInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Review endpoints nested under `/products/:slug`.
pub fn product_reviews_routes() -> Router<AppState> {
    Router::new().route("/:slug/reviews", get(list_reviews).post(submit_review))
}

/// Moderation endpoints mounted at `/reviews`.
pub fn moderation_routes() -> Router<AppState> {
    Router::new().route("/moderate", post(moderate_reviews))
}

/// Echo of a submitted review. Exposes the pending approval state so the
/// caller knows the review is not live yet.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmittedReviewResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_name: String,
    pub rating: i32,
    pub title: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductReviewModel> for SubmittedReviewResponse {
    fn from(model: ProductReviewModel) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            customer_name: model.customer_name,
            rating: model.rating,
            title: model.title,
            is_approved: model.is_approved,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModerationResponse {
    pub approved: bool,
    pub updated: u64,
}

/// List a product's approved reviews
#[utoipa::path(
    get,
    path = "/api/v1/products/{slug}/reviews",
    params(("slug" = String, Path, description = "Product slug"), PaginationParams),
    responses(
        (status = 200, description = "Approved reviews, newest first", body = Page<ReviewView>),
        (status = 404, description = "Unknown or inactive product", body = crate::errors::ErrorResponse)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let reviews = state
        .services
        .reviews
        .list_approved(&slug, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(reviews))
}

/// Submit a review for moderation
#[utoipa::path(
    post,
    path = "/api/v1/products/{slug}/reviews",
    params(("slug" = String, Path, description = "Product slug")),
    request_body = SubmitReviewInput,
    responses(
        (status = 201, description = "Review accepted for moderation", body = SubmittedReviewResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown or inactive product", body = crate::errors::ErrorResponse)
    ),
    tag = "Reviews"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<SubmitReviewInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let review = state
        .services
        .reviews
        .submit(&slug, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(SubmittedReviewResponse::from(review)))
}

/// Bulk approve or disapprove reviews
#[utoipa::path(
    post,
    path = "/api/v1/reviews/moderate",
    request_body = ModerateReviewsInput,
    responses(
        (status = 200, description = "Moderation applied", body = ModerationResponse),
        (status = 400, description = "Empty review id list", body = crate::errors::ErrorResponse)
    ),
    tag = "Reviews"
)]
pub async fn moderate_reviews(
    State(state): State<AppState>,
    Json(payload): Json<ModerateReviewsInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let approved = payload.approved;
    let updated = state
        .services
        .reviews
        .set_approval(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ModerationResponse { approved, updated }))
}
