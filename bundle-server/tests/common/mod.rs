//! Shared helpers for HTTP integration tests

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bundle_server::db::DbService;
use bundle_server::{Config, ServerState, build_app};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::util::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn test_config() -> Config {
    let mut config = Config::with_overrides(std::env::temp_dir().to_string_lossy(), 0);
    config.admin_token = ADMIN_TOKEN.to_string();
    config.nonce_secret = "test-nonce-secret".to_string();
    config.environment = "development".to_string();
    config
}

/// Router on a fresh in-memory database
pub async fn create_test_app() -> Router {
    let db = DbService::in_memory().await.unwrap();
    let state = ServerState::from_db(test_config(), db).await.unwrap();
    build_app(state)
}

/// Helper to make JSON requests
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder.body(Body::from(serde_json::to_string(&json).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, body)
}

pub fn bearer() -> String {
    format!("Bearer {ADMIN_TOKEN}")
}

/// Admin request without a nonce
pub async fn admin_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let auth = bearer();
    json_request(app, method, uri, &[("authorization", &auth)], body).await
}

/// Admin request carrying a fresh nonce for `action`
pub async fn admin_request_with_nonce(
    app: &Router,
    action: &str,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let nonce = fetch_nonce(app, action).await;
    let auth = bearer();
    json_request(
        app,
        method,
        uri,
        &[("authorization", &auth), ("x-admin-nonce", &nonce)],
        body,
    )
    .await
}

pub async fn fetch_nonce(app: &Router, action: &str) -> String {
    let (status, body) =
        admin_request(app, "GET", &format!("/api/admin/nonce?action={action}"), None).await;
    assert_eq!(status, StatusCode::OK, "nonce request failed: {body}");
    body["data"]["nonce"].as_str().unwrap().to_string()
}

pub async fn create_category(app: &Router, name: &str, parent_id: Option<i64>) -> i64 {
    let (status, body) = admin_request(
        app,
        "POST",
        "/api/catalog/categories",
        Some(json!({ "name": name, "parent_id": parent_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create category failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}

pub async fn create_product(app: &Router, name: &str, price: &str, category_ids: &[i64]) -> i64 {
    let (status, body) = admin_request(
        app,
        "POST",
        "/api/catalog/products",
        Some(json!({ "name": name, "price": price, "category_ids": category_ids })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create product failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}

pub async fn create_rule(app: &Router, body: Value) -> (StatusCode, Value) {
    admin_request_with_nonce(app, "save_rule", "POST", "/api/bundle-rules", Some(body)).await
}

/// Money fields serialize as strings; compare them as decimals
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}
