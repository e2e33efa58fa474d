use std::sync::Arc;

use ashwini_catalog::{
    config::AppConfig,
    db,
    entities::{Finish, Material},
    events::{self, EventSender},
    services::products::CreateProductInput,
    AppState,
};
use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness backed by an in-memory SQLite database. One connection
/// keeps the database alive for the lifetime of the pool.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "test");
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let event_sender = Arc::new(EventSender::new(event_tx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = ashwini_catalog::build_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed a category/subcategory pair, returning their slugs.
    pub async fn seed_hierarchy(&self, category: &str, subcategory: &str) -> (String, String) {
        let cat = self
            .state
            .services
            .categories
            .create(ashwini_catalog::services::categories::CreateCategoryInput {
                name: category.to_string(),
                description: None,
                is_active: true,
            })
            .await
            .expect("seed category");
        let sub = self
            .state
            .services
            .subcategories
            .create(
                ashwini_catalog::services::subcategories::CreateSubcategoryInput {
                    category_slug: cat.slug.clone(),
                    name: subcategory.to_string(),
                    description: None,
                    is_active: true,
                },
            )
            .await
            .expect("seed subcategory");
        (cat.slug, sub.slug)
    }

    /// Seed a product with sensible defaults, returning its slug.
    pub async fn seed_product(
        &self,
        name: &str,
        category_slug: &str,
        subcategory_slug: &str,
        price: Decimal,
    ) -> String {
        self.seed_product_with(name, category_slug, subcategory_slug, price, |_| {})
            .await
    }

    /// Seed a product, letting the caller adjust the input before insert.
    pub async fn seed_product_with<F>(
        &self,
        name: &str,
        category_slug: &str,
        subcategory_slug: &str,
        price: Decimal,
        customize: F,
    ) -> String
    where
        F: FnOnce(&mut CreateProductInput),
    {
        let mut input = CreateProductInput {
            name: name.to_string(),
            category_slug: category_slug.to_string(),
            subcategory_slug: subcategory_slug.to_string(),
            short_description: None,
            description: format!("{} seeded for integration tests", name),
            price,
            sale_price: None,
            cost_price: None,
            stock_quantity: 10,
            low_stock_threshold: 5,
            material: Some(Material::Wood),
            finish: Some(Finish::Natural),
            dimensions_length: None,
            dimensions_width: None,
            dimensions_height: None,
            weight: None,
            color: None,
            features: vec![],
            specifications: serde_json::Map::new(),
            is_active: true,
            is_featured: false,
            is_bestseller: false,
            meta_title: None,
            meta_description: None,
        };
        customize(&mut input);

        let product = self
            .state
            .services
            .products
            .create_product(input)
            .await
            .expect("seed product");
        product.slug
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Decode a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Parse a JSON string field as a decimal. Prices serialize as strings;
/// parsing before comparing keeps assertions independent of the scale the
/// backend happens to preserve.
#[allow(dead_code)]
pub fn decimal_field(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal fields serialize as strings")
        .parse()
        .expect("parse decimal field")
}
