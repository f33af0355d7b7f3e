//! Integration tests for the storefront cart API.
//!
//! Each test drives one or more in-process browser sessions through the full
//! router, carrying the session cookie between requests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use campus_market_integration_tests::TestClient;
use serde_json::{Value, json};

fn total(body: &Value) -> f64 {
    body["total"].as_f64().unwrap()
}

fn items(body: &Value) -> &Vec<Value> {
    body["items"].as_array().unwrap()
}

// ============================================================================
// Health & Middleware
// ============================================================================

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::new();
    let resp = client.get("/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!("ok"));
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let mut client = TestClient::new();

    let resp = client.get("/health").await;
    let generated = resp.headers.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);

    let resp = client
        .get_with_headers("/health", &[("x-request-id", "upstream-123")])
        .await;
    assert_eq!(resp.headers.get("x-request-id").unwrap(), "upstream-123");

    let too_long = "x".repeat(200);
    let resp = client
        .get_with_headers("/health", &[("x-request-id", &too_long)])
        .await;
    assert_ne!(resp.headers.get("x-request-id").unwrap(), too_long.as_str());
}

// ============================================================================
// Reading
// ============================================================================

#[tokio::test]
async fn test_fresh_session_has_empty_cart() {
    let mut client = TestClient::new();

    let resp = client.get("/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(items(&resp.body).is_empty());
    assert!(total(&resp.body).abs() < f64::EPSILON);
    assert_eq!(resp.body["formattedTotal"], "KES 0.00");
    assert_eq!(resp.body["itemCount"], 0);

    let resp = client.get("/cart/count").await;
    assert_eq!(resp.body, json!({ "count": 0 }));

    // Reading never creates a session cart
    assert!(client.cookie().is_none());
}

// ============================================================================
// Adding
// ============================================================================

#[tokio::test]
async fn test_add_merges_same_product() {
    let mut client = TestClient::new();

    let first = client
        .post("/cart/add", &json!({ "id": 1, "name": "Desk Lamp", "price": 1000 }))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert!(client.cookie().is_some());

    let resp = client
        .post("/cart/add", &json!({ "id": 1, "name": "Desk Lamp", "price": 1000 }))
        .await;
    let lines = items(&resp.body);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
    assert!((total(&resp.body) - 2000.0).abs() < f64::EPSILON);
    assert_eq!(resp.body["formattedTotal"], "KES 2000.00");
}

#[tokio::test]
async fn test_add_separates_variants() {
    let mut client = TestClient::new();

    client
        .post("/cart/add", &json!({ "id": 2, "price": 500, "selectedSize": "M" }))
        .await;
    let resp = client
        .post("/cart/add", &json!({ "id": 2, "price": 500, "selectedSize": "L" }))
        .await;

    let lines = items(&resp.body);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["selectedSize"], "M");
    assert_eq!(lines[1]["selectedSize"], "L");
    assert_eq!(lines[0]["quantity"], 1);
    assert_eq!(lines[1]["quantity"], 1);
    assert!((total(&resp.body) - 1000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_add_with_quantity() {
    let mut client = TestClient::new();

    let resp = client
        .post(
            "/cart/add",
            &json!({ "id": "notes-101", "price": 250.5, "quantity": 3 }),
        )
        .await;

    let lines = items(&resp.body);
    assert_eq!(lines[0]["id"], "notes-101");
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["formattedLineTotal"], "KES 751.50");
    assert!((total(&resp.body) - 751.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_add_rejects_missing_id_and_price() {
    let mut client = TestClient::new();

    let resp = client
        .post("/cart/add", &json!({ "name": "Mystery", "price": 100 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!("Cart error: product id is required"));

    let resp = client.post("/cart/add", &json!({ "id": 9 })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!("Cart error: product price is required"));

    let resp = client.get("/cart").await;
    assert!(items(&resp.body).is_empty());
}

#[tokio::test]
async fn test_add_rejects_zero_quantity() {
    let mut client = TestClient::new();

    let resp = client
        .post("/cart/add", &json!({ "id": 1, "price": 10, "quantity": 0 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_rejects_total_past_decimal_range() {
    let mut client = TestClient::new();

    // 1e28 per unit; ten units exceed the largest representable total
    let body: Value =
        serde_json::from_str(r#"{ "id": 1, "price": 10000000000000000000000000000, "quantity": 10 }"#)
            .unwrap();
    let resp = client.post("/cart/add", &body).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body,
        json!("Cart error: cart total would be too large after changing product 1")
    );

    let resp = client.get("/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(items(&resp.body).is_empty());
}

#[tokio::test]
async fn test_update_rejects_total_past_decimal_range() {
    let mut client = TestClient::new();
    let body: Value =
        serde_json::from_str(r#"{ "id": 1, "price": 10000000000000000000000000000 }"#).unwrap();
    let resp = client.post("/cart/add", &body).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = client
        .post("/cart/update", &json!({ "id": 1, "quantity": 10 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client.get("/cart").await;
    assert_eq!(items(&resp.body)[0]["quantity"], 1);
    assert_eq!(
        resp.body["total"].to_string(),
        "10000000000000000000000000000"
    );
}

#[tokio::test]
async fn test_prices_keep_every_digit() {
    let mut client = TestClient::new();
    let body: Value =
        serde_json::from_str(r#"{ "id": 1, "price": 12345678901234567.89 }"#).unwrap();

    let resp = client.post("/cart/add", &body).await;
    assert_eq!(items(&resp.body)[0]["price"].to_string(), "12345678901234567.89");
    assert_eq!(resp.body["total"].to_string(), "12345678901234567.89");
    assert_eq!(resp.body["formattedTotal"], "KES 12345678901234567.89");
}

// ============================================================================
// Updating & Removing
// ============================================================================

#[tokio::test]
async fn test_update_quantity() {
    let mut client = TestClient::new();
    client
        .post("/cart/add", &json!({ "id": 1, "price": 1000, "quantity": 2 }))
        .await;

    let resp = client
        .post("/cart/update", &json!({ "id": 1, "quantity": 5 }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(items(&resp.body)[0]["quantity"], 5);
    assert!((total(&resp.body) - 5000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_update_below_one_is_ignored() {
    let mut client = TestClient::new();
    client
        .post("/cart/add", &json!({ "id": 1, "price": 1000, "quantity": 2 }))
        .await;

    for quantity in [0, -3] {
        let resp = client
            .post("/cart/update", &json!({ "id": 1, "quantity": quantity }))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(items(&resp.body)[0]["quantity"], 2);
        assert!((total(&resp.body) - 2000.0).abs() < f64::EPSILON);
    }
}

#[tokio::test]
async fn test_update_unknown_line_is_noop() {
    let mut client = TestClient::new();
    client.post("/cart/add", &json!({ "id": 1, "price": 10 })).await;

    let resp = client
        .post("/cart/update", &json!({ "id": 99, "quantity": 4 }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(items(&resp.body).len(), 1);
    assert_eq!(items(&resp.body)[0]["quantity"], 1);
}

#[tokio::test]
async fn test_remove_only_matching_variant() {
    let mut client = TestClient::new();
    client
        .post("/cart/add", &json!({ "id": 2, "price": 500, "selectedSize": "M" }))
        .await;
    client
        .post("/cart/add", &json!({ "id": 2, "price": 500, "selectedSize": "L" }))
        .await;

    let resp = client
        .post("/cart/remove", &json!({ "id": 2, "selectedSize": "M" }))
        .await;
    let lines = items(&resp.body);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["selectedSize"], "L");
    assert!((total(&resp.body) - 500.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_numeric_and_text_ids_are_distinct() {
    let mut client = TestClient::new();
    client.post("/cart/add", &json!({ "id": 7, "price": 10 })).await;
    let resp = client
        .post("/cart/add", &json!({ "id": "7", "price": 10 }))
        .await;
    assert_eq!(items(&resp.body).len(), 2);

    let resp = client.post("/cart/remove", &json!({ "id": "7" })).await;
    let lines = items(&resp.body);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["id"], 7);
}

#[tokio::test]
async fn test_clear_and_count() {
    let mut client = TestClient::new();
    client
        .post("/cart/add", &json!({ "id": 1, "price": 10, "quantity": 2 }))
        .await;
    client
        .post("/cart/add", &json!({ "id": 2, "price": 20, "quantity": 3 }))
        .await;

    let resp = client.get("/cart/count").await;
    assert_eq!(resp.body, json!({ "count": 5 }));

    let resp = client.post("/cart/clear", &json!({})).await;
    assert!(items(&resp.body).is_empty());
    assert!(total(&resp.body).abs() < f64::EPSILON);

    let resp = client.get("/cart/count").await;
    assert_eq!(resp.body, json!({ "count": 0 }));
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_sessions_have_separate_carts() {
    let mut alice = TestClient::new();
    let mut bob = alice.new_session();

    alice.post("/cart/add", &json!({ "id": 1, "price": 10 })).await;
    bob.post("/cart/add", &json!({ "id": 2, "price": 20 })).await;

    let alice_cart = alice.get("/cart").await;
    let bob_cart = bob.get("/cart").await;
    assert_eq!(items(&alice_cart.body)[0]["id"], 1);
    assert_eq!(items(&bob_cart.body)[0]["id"], 2);
    assert_eq!(items(&alice_cart.body).len(), 1);
    assert_eq!(items(&bob_cart.body).len(), 1);
}
