mod common;

use axum::http::Method;
use rust_decimal_macros::dec;
use serde_json::Value;

use common::{decimal_field, response_json, TestApp};

async fn seed_catalog(app: &TestApp) {
    let (living, sofas) = app.seed_hierarchy("Living Room", "Sofas").await;
    let (office, desks) = app.seed_hierarchy("Office", "Desks").await;

    app.seed_product_with("Velvet Sofa", &living, &sofas, dec!(899.00), |p| {
        p.material = Some(ashwini_catalog::entities::Material::Fabric);
        p.finish = None;
        p.color = Some("Blue".to_string());
        p.is_featured = true;
        p.sale_price = Some(dec!(749.00));
    })
    .await;
    app.seed_product_with("Leather Sofa", &living, &sofas, dec!(1299.00), |p| {
        p.material = Some(ashwini_catalog::entities::Material::Leather);
        p.color = Some("brown".to_string());
        p.is_bestseller = true;
        p.stock_quantity = 0;
    })
    .await;
    app.seed_product_with("Standing Desk", &office, &desks, dec!(449.00), |p| {
        p.material = Some(ashwini_catalog::entities::Material::Wood);
        p.finish = Some(ashwini_catalog::entities::Finish::Varnished);
        p.short_description = Some("Height adjustable workstation".to_string());
    })
    .await;
    app.seed_product_with("Glass Desk", &office, &desks, dec!(349.00), |p| {
        p.material = Some(ashwini_catalog::entities::Material::Glass);
        // Sale price at or above the regular price does not count as a sale
        p.sale_price = Some(dec!(349.00));
    })
    .await;
}

async fn list(app: &TestApp, query: &str) -> Value {
    let uri = format!("/api/v1/products{}", query);
    let response = app.request(Method::GET, &uri, None).await;
    assert_eq!(response.status(), 200, "GET {} failed", uri);
    response_json(response).await
}

fn names(page: &Value) -> Vec<&str> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn filters_combine_with_and() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let page = list(&app, "?category=living-room").await;
    assert_eq!(page["total"], 2);

    let page = list(&app, "?category=office&material=glass").await;
    assert_eq!(names(&page), vec!["Glass Desk"]);

    let page = list(&app, "?subcategory=desks&finish=varnished").await;
    assert_eq!(names(&page), vec!["Standing Desk"]);

    // Color matching ignores case
    let page = list(&app, "?color=BROWN").await;
    assert_eq!(names(&page), vec!["Leather Sofa"]);

    let page = list(&app, "?is_featured=true").await;
    assert_eq!(names(&page), vec!["Velvet Sofa"]);

    let page = list(&app, "?is_bestseller=true").await;
    assert_eq!(names(&page), vec!["Leather Sofa"]);

    // An unknown category slug matches nothing rather than erroring
    let page = list(&app, "?category=garage").await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn price_sale_and_stock_filters() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let page = list(&app, "?min_price=400&max_price=1000").await;
    let mut found = names(&page);
    found.sort();
    assert_eq!(found, vec!["Standing Desk", "Velvet Sofa"]);

    // Only a sale price strictly below the regular price counts
    let page = list(&app, "?on_sale=true").await;
    assert_eq!(names(&page), vec!["Velvet Sofa"]);

    let page = list(&app, "?in_stock=true").await;
    assert_eq!(page["total"], 3);
    assert!(!names(&page).contains(&"Leather Sofa"));
}

#[tokio::test]
async fn ordering_and_pagination() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let page = list(&app, "?ordering=price").await;
    assert_eq!(
        names(&page),
        vec!["Glass Desk", "Standing Desk", "Velvet Sofa", "Leather Sofa"]
    );

    let page = list(&app, "?ordering=-price").await;
    assert_eq!(
        names(&page),
        vec!["Leather Sofa", "Velvet Sofa", "Standing Desk", "Glass Desk"]
    );

    let page = list(&app, "?ordering=name").await;
    assert_eq!(
        names(&page),
        vec!["Glass Desk", "Leather Sofa", "Standing Desk", "Velvet Sofa"]
    );

    // Unsupported ordering fields are rejected, not silently ignored
    let response = app
        .request(Method::GET, "/api/v1/products?ordering=stock_quantity", None)
        .await;
    assert_eq!(response.status(), 400);

    // Pagination splits deterministically under a fixed ordering
    let page = list(&app, "?ordering=name&per_page=3").await;
    assert_eq!(page["total"], 4);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);

    let page = list(&app, "?ordering=name&per_page=3&page=2").await;
    assert_eq!(names(&page), vec!["Velvet Sofa"]);

    // per_page is capped
    let page = list(&app, "?per_page=5000").await;
    assert_eq!(page["per_page"], 100);
}

#[tokio::test]
async fn malformed_query_values_return_structured_errors() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    // A non-numeric price filter gets the standard JSON error body
    let response = app
        .request(Method::GET, "/api/v1/products?min_price=abc", None)
        .await;
    assert_eq!(response.status(), 400);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"));
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].as_str().unwrap().contains("deserialize"));
    assert!(body["timestamp"].is_string());

    // Unknown enum values in filters are rejected the same way
    let response = app
        .request(Method::GET, "/api/v1/products?material=granite", None)
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");

    // Nested listings share the extractor
    let response = app
        .request(
            Method::GET,
            "/api/v1/categories/living-room/products?max_price=lots",
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn search_spans_text_sku_and_parent_names() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    // Name match, case-insensitive
    let page = list(&app, "/search?q=velvet").await;
    assert_eq!(names(&page), vec!["Velvet Sofa"]);

    // Short description match
    let page = list(&app, "/search?q=workstation").await;
    assert_eq!(names(&page), vec!["Standing Desk"]);

    // Category name match
    let page = list(&app, "/search?q=OFFICE").await;
    assert_eq!(page["total"], 2);

    // SKU prefix matches every product
    let page = list(&app, "/search?q=ashwi-").await;
    assert_eq!(page["total"], 4);

    // A token that only occurs in a subcategory name still finds its products
    let (kids, bunks) = app.seed_hierarchy("Kids", "Bunk Beds").await;
    app.seed_product("Trundle Cot", &kids, &bunks, dec!(280.00))
        .await;
    let page = list(&app, "/search?q=bunk").await;
    assert_eq!(names(&page), vec!["Trundle Cot"]);

    // Empty or missing queries are rejected
    let response = app
        .request(Method::GET, "/api/v1/products/search?q=", None)
        .await;
    assert_eq!(response.status(), 400);
    let response = app
        .request(Method::GET, "/api/v1/products/search", None)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn nested_listings_scope_to_their_parent() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let response = app
        .request(Method::GET, "/api/v1/categories/office/products", None)
        .await;
    assert_eq!(response.status(), 200);
    let page = response_json(response).await;
    assert_eq!(page["total"], 2);

    // Filters still apply inside the nested listing
    let response = app
        .request(
            Method::GET,
            "/api/v1/categories/office/products?material=glass",
            None,
        )
        .await;
    let page = response_json(response).await;
    assert_eq!(names(&page), vec!["Glass Desk"]);

    let response = app
        .request(
            Method::GET,
            "/api/v1/subcategories/living-room/sofas/products?ordering=price",
            None,
        )
        .await;
    let page = response_json(response).await;
    assert_eq!(names(&page), vec!["Velvet Sofa", "Leather Sofa"]);

    // Unknown parents are a 404, not an empty page
    let response = app
        .request(Method::GET, "/api/v1/categories/garage/products", None)
        .await;
    assert_eq!(response.status(), 404);
    let response = app
        .request(
            Method::GET,
            "/api/v1/subcategories/office/sofas/products",
            None,
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn curated_listing_routes() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let page = list(&app, "/featured").await;
    assert_eq!(names(&page), vec!["Velvet Sofa"]);

    let page = list(&app, "/bestsellers").await;
    assert_eq!(names(&page), vec!["Leather Sofa"]);

    let page = list(&app, "/on-sale").await;
    assert_eq!(names(&page), vec!["Velvet Sofa"]);
}

#[tokio::test]
async fn summaries_carry_derived_pricing() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let page = list(&app, "?search=velvet").await;
    let item = &page["items"][0];
    assert_eq!(item["is_on_sale"], true);
    assert_eq!(decimal_field(&item["current_price"]), dec!(749.00));
    // floor((899 - 749) / 899 * 100) = 16
    assert_eq!(item["discount_percentage"], 16);

    let page = list(&app, "?search=glass").await;
    let item = &page["items"][0];
    assert_eq!(item["is_on_sale"], false);
    assert_eq!(decimal_field(&item["current_price"]), dec!(349.00));
    assert_eq!(item["discount_percentage"], 0);

    let page = list(&app, "?search=leather").await;
    let item = &page["items"][0];
    assert_eq!(item["is_out_of_stock"], true);
    assert_eq!(item["is_low_stock"], true);
}
