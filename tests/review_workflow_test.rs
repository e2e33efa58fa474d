mod common;

use axum::http::Method;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{response_json, TestApp};

fn review_payload(name: &str, rating: i32) -> serde_json::Value {
    json!({
        "customer_name": name,
        "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        "rating": rating,
        "title": format!("{} stars", rating),
        "comment": "Solid build, arrived on time."
    })
}

async fn submit_review(app: &TestApp, slug: &str, name: &str, rating: i32) -> String {
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/reviews", slug),
            Some(review_payload(name, rating)),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    assert_eq!(body["is_approved"], false);
    body["id"].as_str().unwrap().to_string()
}

async fn moderate(app: &TestApp, ids: &[String], approved: bool) -> u64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/reviews/moderate",
            Some(json!({ "review_ids": ids, "approved": approved })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    body["updated"].as_u64().unwrap()
}

#[tokio::test]
async fn reviews_are_invisible_until_approved() {
    let app = TestApp::new().await;
    let (category, subcategory) = app.seed_hierarchy("Living Room", "Sofas").await;
    let slug = app
        .seed_product("Corner Sofa", &category, &subcategory, dec!(650.00))
        .await;

    let review_id = submit_review(&app, &slug, "Asha Rao", 5).await;

    // Pending reviews do not show up anywhere
    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}/reviews", slug), None)
        .await;
    let page = response_json(response).await;
    assert_eq!(page["total"], 0);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", slug), None)
        .await;
    let detail = response_json(response).await;
    assert_eq!(detail["review_count"], 0);
    assert_eq!(detail["average_rating"], 0.0);

    // Approval makes them visible
    let updated = moderate(&app, &[review_id], true).await;
    assert_eq!(updated, 1);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}/reviews", slug), None)
        .await;
    let page = response_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["customer_name"], "Asha Rao");
    assert_eq!(page["items"][0]["rating"], 5);
    // Reviewer emails never leave the service
    assert!(page["items"][0].get("email").is_none());
}

#[tokio::test]
async fn rating_aggregate_covers_approved_reviews_only() {
    let app = TestApp::new().await;
    let (category, subcategory) = app.seed_hierarchy("Office", "Chairs").await;
    let slug = app
        .seed_product("Mesh Chair", &category, &subcategory, dec!(210.00))
        .await;

    let first = submit_review(&app, &slug, "Ravi Kumar", 4).await;
    let second = submit_review(&app, &slug, "Meera Nair", 3).await;
    let _pending = submit_review(&app, &slug, "Unmoderated User", 1).await;

    moderate(&app, &[first, second], true).await;

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", slug), None)
        .await;
    let detail = response_json(response).await;
    assert_eq!(detail["review_count"], 2);
    assert_eq!(detail["average_rating"], 3.5);
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 2);

    // The listing carries the same aggregate
    let response = app.request(Method::GET, "/api/v1/products", None).await;
    let page = response_json(response).await;
    assert_eq!(page["items"][0]["average_rating"], 3.5);
    assert_eq!(page["items"][0]["review_count"], 2);
}

#[tokio::test]
async fn bulk_moderation_toggles_both_ways() {
    let app = TestApp::new().await;
    let (category, subcategory) = app.seed_hierarchy("Bedroom", "Beds").await;
    let slug = app
        .seed_product("Teak Bed", &category, &subcategory, dec!(990.00))
        .await;

    let mut ids = Vec::new();
    for i in 1..=3 {
        ids.push(submit_review(&app, &slug, &format!("Reviewer {}", i), i).await);
    }

    assert_eq!(moderate(&app, &ids, true).await, 3);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}/reviews", slug), None)
        .await;
    assert_eq!(response_json(response).await["total"], 3);

    // Disapprove two of them again
    assert_eq!(moderate(&app, &ids[..2].to_vec(), false).await, 2);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}/reviews", slug), None)
        .await;
    assert_eq!(response_json(response).await["total"], 1);

    // Unknown ids are skipped, not an error
    let ghost = vec![uuid::Uuid::new_v4().to_string()];
    assert_eq!(moderate(&app, &ghost, true).await, 0);

    // An empty id list is rejected
    let response = app
        .request(
            Method::POST,
            "/api/v1/reviews/moderate",
            Some(json!({ "review_ids": [], "approved": true })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn review_validation_rules() {
    let app = TestApp::new().await;
    let (category, subcategory) = app.seed_hierarchy("Office", "Desks").await;
    let slug = app
        .seed_product("Ash Desk", &category, &subcategory, dec!(320.00))
        .await;

    // Rating outside 1..=5
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/reviews", slug),
            Some(review_payload("Out Of Range", 6)),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Invalid email
    let mut payload = review_payload("Bad Email", 4);
    payload["email"] = json!("not-an-email");
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/reviews", slug),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Unknown product
    let response = app
        .request(
            Method::POST,
            "/api/v1/products/no-such-product/reviews",
            Some(review_payload("Lost Customer", 4)),
        )
        .await;
    assert_eq!(response.status(), 404);

    // Inactive products reject reviews the same way unknown ones do
    let hidden = app
        .seed_product_with("Retired Desk", &category, &subcategory, dec!(280.00), |p| {
            p.is_active = false;
        })
        .await;
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/reviews", hidden),
            Some(review_payload("Too Late", 4)),
        )
        .await;
    assert_eq!(response.status(), 404);
}
