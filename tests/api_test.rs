mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::TestApp;
use shopfront::api;
use shopfront::domain::aggregates::IntegrationSettings;

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder.header(header::CONTENT_TYPE, "application/json").body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = api::router(app.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_product_create_and_list() {
    let app = TestApp::new();
    let (status, created) =
        send(&app, Method::POST, "/api/products", Some(json!({ "name": "Remera Lisa", "price": 1000, "stock": 5 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Remera Lisa");
    assert_eq!(created["active"], true);

    send(&app, Method::POST, "/api/products", Some(json!({ "name": "Gorra", "price": 500 }))).await;

    let (status, page) = send(&app, Method::GET, "/api/products?search=remera", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["id"], created["id"]);

    let id = created["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_shape() {
    let app = TestApp::new();
    let (status, body) = send(&app, Method::GET, "/api/orders/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Order nope not found" }));

    let (status, body) = send(&app, Method::POST, "/api/products", Some(json!({ "name": "" , "price": 10 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/checkout")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = api::router(app.state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_checkout_endpoint() {
    let app = TestApp::new();
    let request = json!({
        "items": [{ "productId": "p1", "name": "Taza", "price": 300, "quantity": 2 }],
        "total": 600,
        "email": "cliente@example.com",
        "shipping": { "method": "pickup", "fee": 0 }
    });
    let (status, body) = send(&app, Method::POST, "/api/checkout", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let order_id = body["orderId"].as_str().unwrap();
    assert_eq!(body["url"], format!("https://pay.test/{order_id}"));

    let (status, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn test_settings_are_redacted() {
    let app = TestApp::new();
    app.save_settings(IntegrationSettings {
        webhook_token: Some("secret-token".into()),
        payment_access_token: Some("APP_USR-123".into()),
        ..Default::default()
    })
    .await;

    let (status, body) = send(&app, Method::GET, "/api/settings/integrations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["webhookTokenSet"], true);
    assert_eq!(body["paymentAccessTokenSet"], true);
    let text = body.to_string();
    assert!(!text.contains("secret-token"));
    assert!(!text.contains("APP_USR-123"));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings/integrations",
        Some(json!({ "orderWebhookUrl": "ftp://nope", "orderWebhookEnabled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_active_promotions() {
    let app = TestApp::new();
    for (image, position, active) in [("b.jpg", 2, true), ("a.jpg", 1, true), ("off.jpg", 0, false)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/promotions",
            Some(json!({ "imageUrl": image, "position": position, "active": active })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/promotions/active", None).await;
    assert_eq!(status, StatusCode::OK);
    let images: Vec<&str> = body.as_array().unwrap().iter().map(|p| p["imageUrl"].as_str().unwrap()).collect();
    assert_eq!(images, ["a.jpg", "b.jpg"]);
}

#[tokio::test]
async fn test_duplicate_coupon_code_is_bad_request() {
    let app = TestApp::new();
    let (status, _) =
        send(&app, Method::POST, "/api/coupons", Some(json!({ "code": "dup", "discountType": "percentage", "value": 10 }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        send(&app, Method::POST, "/api/coupons", Some(json!({ "code": "DUP", "discountType": "percentage", "value": 50 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, coupons) = send(&app, Method::GET, "/api/coupons", None).await;
    assert_eq!(coupons.as_array().unwrap().len(), 1);
}
