//! User & Health Tests

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_and_fetch_user() {
    let app = app().await;

    let resp = app
        .post_json("/users", json!({ "display_name": "  alice  " }), None)
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let id = resp.id();
    assert_eq!(resp.json()["display_name"].as_str().unwrap(), "alice");

    let resp = app.get(&format!("/users/{}", id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["id"].as_str().unwrap(), id.to_string());
    assert_eq!(body["display_name"].as_str().unwrap(), "alice");
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn display_name_is_validated() {
    let app = app().await;

    let resp = app.post_json("/users", json!({ "display_name": "" }), None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "display_name is required");

    let resp = app
        .post_json("/users", json!({ "display_name": "x".repeat(65) }), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.error_message(),
        "display_name must be at most 64 characters"
    );

    let resp = app.post_json("/users", json!({}), None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = app().await;

    let resp = app.get(&format!("/users/{}", Uuid::new_v4())).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "user not found");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;

    let resp = app.get("/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"].as_str().unwrap(), "ok");
}
