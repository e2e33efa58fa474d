mod common;

use axum::http::Method;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal_field, response_json, TestApp};

#[tokio::test]
async fn category_crud_and_browsing() {
    let app = TestApp::new().await;

    // Create two categories through the API
    let response = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Living Room", "description": "Sofas and tables" })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created = response_json(response).await;
    assert_eq!(created["slug"], "living-room");
    assert_eq!(created["is_active"], true);

    let response = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Bedroom" })),
        )
        .await;
    assert_eq!(response.status(), 201);

    // Duplicate names are rejected
    let response = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Living Room" })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Listing is ordered by name
    let response = app.request(Method::GET, "/api/v1/categories", None).await;
    assert_eq!(response.status(), 200);
    let list = response_json(response).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bedroom", "Living Room"]);

    // Detail by slug
    let response = app
        .request(Method::GET, "/api/v1/categories/living-room", None)
        .await;
    assert_eq!(response.status(), 200);
    let detail = response_json(response).await;
    assert_eq!(detail["name"], "Living Room");
    assert_eq!(detail["description"], "Sofas and tables");

    // Unknown slug is a 404
    let response = app
        .request(Method::GET, "/api/v1/categories/garage", None)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn subcategory_scoping_under_parent() {
    let app = TestApp::new().await;
    let (living, _) = app.seed_hierarchy("Living Room", "Sofas").await;
    let (bedroom, _) = app.seed_hierarchy("Bedroom", "Beds").await;

    // The same name may exist under different parents
    let response = app
        .request(
            Method::POST,
            "/api/v1/subcategories",
            Some(json!({ "category_slug": bedroom, "name": "Sofas" })),
        )
        .await;
    assert_eq!(response.status(), 201);

    // But not twice under the same parent
    let response = app
        .request(
            Method::POST,
            "/api/v1/subcategories",
            Some(json!({ "category_slug": living, "name": "Sofas" })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Unknown parent is a 404
    let response = app
        .request(
            Method::POST,
            "/api/v1/subcategories",
            Some(json!({ "category_slug": "garage", "name": "Shelves" })),
        )
        .await;
    assert_eq!(response.status(), 404);

    // Subcategory detail resolves through the parent slug
    let response = app
        .request(Method::GET, "/api/v1/subcategories/bedroom/sofas", None)
        .await;
    assert_eq!(response.status(), 200);
    let detail = response_json(response).await;
    assert_eq!(detail["name"], "Sofas");

    // Nested listing under the category
    let response = app
        .request(
            Method::GET,
            "/api/v1/categories/living-room/subcategories",
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let list = response_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["slug"], "sofas");

    // Collection listing, optionally narrowed by category
    let response = app.request(Method::GET, "/api/v1/subcategories", None).await;
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 3);

    let response = app
        .request(Method::GET, "/api/v1/subcategories?category=bedroom", None)
        .await;
    let list = response_json(response).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Beds", "Sofas"]);

    let response = app
        .request(Method::GET, "/api/v1/subcategories?category=garage", None)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn product_detail_includes_derived_fields_and_related() {
    let app = TestApp::new().await;
    let (category, subcategory) = app.seed_hierarchy("Living Room", "Sofas").await;

    let slug = app
        .seed_product_with("Oak Lounger", &category, &subcategory, dec!(300.00), |p| {
            p.sale_price = Some(dec!(225.00));
            p.stock_quantity = 3;
            p.low_stock_threshold = 5;
        })
        .await;

    // Five siblings; only four should come back as related
    for i in 1..=5 {
        app.seed_product(
            &format!("Sofa Number {}", i),
            &category,
            &subcategory,
            dec!(199.99),
        )
        .await;
    }

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", slug), None)
        .await;
    assert_eq!(response.status(), 200);
    let detail = response_json(response).await;

    assert_eq!(detail["slug"], "oak-lounger");
    assert_eq!(detail["is_on_sale"], true);
    assert_eq!(decimal_field(&detail["current_price"]), dec!(225.00));
    assert_eq!(detail["discount_percentage"], 25);
    assert_eq!(detail["is_low_stock"], true);
    assert_eq!(detail["is_out_of_stock"], false);
    assert_eq!(detail["category"]["slug"], category);
    assert_eq!(detail["subcategory"]["slug"], subcategory);
    // All six active products live under the same parents
    assert_eq!(detail["category"]["products_count"], 6);
    assert_eq!(detail["subcategory"]["products_count"], 6);
    assert_eq!(detail["related_products"].as_array().unwrap().len(), 4);
    assert!(detail["sku"]
        .as_str()
        .unwrap()
        .starts_with("ASHWI-"));

    // Unknown product slug is a 404
    let response = app
        .request(Method::GET, "/api/v1/products/no-such-product", None)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn inactive_products_are_hidden() {
    let app = TestApp::new().await;
    let (category, subcategory) = app.seed_hierarchy("Office", "Desks").await;

    let slug = app
        .seed_product_with("Retired Desk", &category, &subcategory, dec!(120.00), |p| {
            p.is_active = false;
        })
        .await;

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", slug), None)
        .await;
    assert_eq!(response.status(), 404);

    let response = app.request(Method::GET, "/api/v1/products", None).await;
    let page = response_json(response).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn image_primary_promotion_is_exclusive() {
    let app = TestApp::new().await;
    let (category, subcategory) = app.seed_hierarchy("Office", "Desks").await;
    let slug = app
        .seed_product("Walnut Desk", &category, &subcategory, dec!(499.00))
        .await;

    // First image becomes primary, second does not
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/images", slug),
            Some(json!({
                "image_url": "https://images.example.com/desk-front.jpg",
                "alt_text": "Front view",
                "is_primary": true,
                "sort_order": 0
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/images", slug),
            Some(json!({
                "image_url": "https://images.example.com/desk-side.jpg",
                "sort_order": 1
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let second = response_json(response).await;
    let second_id = second["id"].as_str().unwrap().to_string();

    // Promote the second; the first must lose its flag
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}/images/{}/primary", slug, second_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}/images", slug), None)
        .await;
    let images = response_json(response).await;
    let primaries: Vec<bool> = images
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["is_primary"].as_bool().unwrap())
        .collect();
    assert_eq!(primaries.iter().filter(|p| **p).count(), 1);
    assert_eq!(images[1]["id"], second_id.as_str());
    assert_eq!(images[1]["is_primary"], true);

    // The is_primary filter narrows the listing
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}/images?is_primary=true", slug),
            None,
        )
        .await;
    let primary_only = response_json(response).await;
    assert_eq!(primary_only.as_array().unwrap().len(), 1);
    assert_eq!(primary_only[0]["id"], second_id.as_str());

    // The listing surfaces the promoted image as primary
    let response = app.request(Method::GET, "/api/v1/products", None).await;
    let page = response_json(response).await;
    assert_eq!(page["items"][0]["primary_image"]["id"], second_id.as_str());

    // Uploading a new primary image demotes the current one
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/images", slug),
            Some(json!({
                "image_url": "https://images.example.com/desk-top.jpg",
                "is_primary": true,
                "sort_order": 2
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let third = response_json(response).await;
    let third_id = third["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}/images?is_primary=true", slug),
            None,
        )
        .await;
    let primary_only = response_json(response).await;
    assert_eq!(primary_only.as_array().unwrap().len(), 1);
    assert_eq!(primary_only[0]["id"], third_id.as_str());

    // Promoting an image of another product is a 404
    let other_slug = app
        .seed_product("Pine Desk", &category, &subcategory, dec!(250.00))
        .await;
    let response = app
        .request(
            Method::PUT,
            &format!(
                "/api/v1/products/{}/images/{}/primary",
                other_slug, second_id
            ),
            None,
        )
        .await;
    assert_eq!(response.status(), 404);

    // Bad image URLs are rejected
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/images", slug),
            Some(json!({ "image_url": "not a url" })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn unique_index_violations_surface_as_validation_errors() {
    use ashwini_catalog::{entities::category, errors::ServiceError};
    use sea_orm::{ActiveModelTrait, Set};

    let app = TestApp::new().await;
    let (category_slug, _) = app.seed_hierarchy("Living Room", "Sofas").await;

    // Insert a duplicate slug directly, the way a writer losing the race
    // against the service's pre-check would
    let now = chrono::Utc::now();
    let duplicate = category::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        name: Set("Living Room Annex".to_string()),
        slug: Set(category_slug),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let err = duplicate
        .insert(&*app.state.db)
        .await
        .expect_err("duplicate slug must hit the unique index");

    let service_err = ServiceError::from(err);
    assert!(matches!(service_err, ServiceError::ValidationError(_)));
    assert_eq!(service_err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_status_endpoints() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = app.request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["database"], "up");
}
