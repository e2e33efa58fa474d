//! Ashwini Catalog: a read-mostly product catalog API.
//!
//! Categories and subcategories form a two-level hierarchy; products hang
//! off both, carry pricing and inventory, and expose images and moderated
//! customer reviews. Handlers stay thin and delegate to the services in
//! [`services`]; persistence goes through SeaORM entities in [`entities`].

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod slug;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// All `/api/v1` routes. Image and review routes nest under the product
/// subtree so they share the `/products/:slug` prefix.
pub fn api_v1_routes() -> Router<AppState> {
    let products = handlers::products::products_routes()
        .merge(handlers::images::images_routes())
        .merge(handlers::reviews::product_reviews_routes());

    Router::new()
        .nest("/categories", handlers::categories::categories_routes())
        .nest(
            "/subcategories",
            handlers::subcategories::subcategories_routes(),
        )
        .nest("/products", products)
        .nest("/reviews", handlers::reviews::moderation_routes())
        .route("/status", get(api_status))
}

/// Builds the full application router, including health endpoints and the
/// Swagger UI. Used by both `main` and the integration tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .with_state(state)
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "Health"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe including a database round trip
async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
    let database = match db::ping(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({
        "status": "ok",
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
