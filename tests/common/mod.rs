#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use agora::infra::store::MemoryStore;
use agora::AppState;

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token-12345";

// ---------------------------------------------------------------------------
// TestApp: one fresh in-memory forum per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }

    pub fn id(&self) -> Uuid {
        let body = self.json();
        let id = body["id"]
            .as_str()
            .unwrap_or_else(|| panic!("response has no id: {}", body));
        Uuid::parse_str(id).expect("id is not a uuid")
    }
}

pub async fn app() -> TestApp {
    TestApp::new()
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState {
            store: Arc::new(MemoryStore::new()),
            admin_token: Some(TEST_ADMIN_TOKEN.to_string()),
        };
        let router = agora::http::router(state.clone());
        TestApp { router, state }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        headers: &[(&str, String)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        for (key, value) in headers {
            builder = builder.header(*key, value.as_str());
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    fn user_headers(user: Option<Uuid>) -> Vec<(&'static str, String)> {
        user.map(|id| vec![("x-user-id", id.to_string())])
            .unwrap_or_default()
    }

    fn admin_headers(token: Option<&str>) -> Vec<(&'static str, String)> {
        token
            .map(|t| vec![("x-admin-token", t.to_string())])
            .unwrap_or_default()
    }

    fn json_body(body: Value) -> Option<Body> {
        Some(Body::from(serde_json::to_string(&body).unwrap()))
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, &[]).await
    }

    pub async fn post_json(&self, path: &str, body: Value, user: Option<Uuid>) -> TestResponse {
        self.request(Method::POST, path, Self::json_body(body), &Self::user_headers(user))
            .await
    }

    pub async fn put_json(&self, path: &str, body: Value, user: Option<Uuid>) -> TestResponse {
        self.request(Method::PUT, path, Self::json_body(body), &Self::user_headers(user))
            .await
    }

    pub async fn put_raw(&self, path: &str, raw: &str, user: Option<Uuid>) -> TestResponse {
        self.request(
            Method::PUT,
            path,
            Some(Body::from(raw.to_string())),
            &Self::user_headers(user),
        )
        .await
    }

    pub async fn delete(&self, path: &str, user: Option<Uuid>) -> TestResponse {
        self.request(Method::DELETE, path, None, &Self::user_headers(user))
            .await
    }

    /// POST with an admin token in the x-admin-token header.
    pub async fn post_admin(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, path, Self::json_body(body), &Self::admin_headers(token))
            .await
    }

    pub async fn put_admin(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::PUT, path, Self::json_body(body), &Self::admin_headers(token))
            .await
    }

    pub async fn delete_admin(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, path, None, &Self::admin_headers(token))
            .await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    pub async fn create_user(&self, name: &str) -> Uuid {
        let resp = self
            .post_json("/users", json!({ "display_name": name }), None)
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create user: {}", resp.json());
        resp.id()
    }

    pub async fn create_subforum(&self, name: &str, parent_id: Option<Uuid>) -> Uuid {
        let resp = self
            .post_admin(
                "/subforums",
                json!({ "name": name, "parent_id": parent_id }),
                Some(TEST_ADMIN_TOKEN),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create subforum: {}", resp.json());
        resp.id()
    }

    pub async fn grant_role(&self, subforum_id: Uuid, user_id: Uuid) -> Uuid {
        let resp = self
            .post_admin(
                &format!("/subforums/{}/roles", subforum_id),
                json!({ "user_id": user_id }),
                Some(TEST_ADMIN_TOKEN),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "grant role: {}", resp.json());
        resp.id()
    }

    pub async fn create_post(&self, user_id: Uuid, subforum_id: Uuid, title: &str) -> Uuid {
        let resp = self
            .post_json(
                "/posts",
                json!({
                    "subforum_id": subforum_id,
                    "title": title,
                    "content": format!("body of {}", title),
                }),
                Some(user_id),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create post: {}", resp.json());
        resp.id()
    }

    /// User ids holding a role on the subforum, in grant order.
    pub async fn role_holders(&self, subforum_id: Uuid) -> Vec<Uuid> {
        let resp = self.get(&format!("/subforums/{}/roles", subforum_id)).await;
        assert_eq!(resp.status, StatusCode::OK);
        resp.json()
            .as_array()
            .expect("roles array")
            .iter()
            .map(|role| Uuid::parse_str(role["user_id"].as_str().unwrap()).unwrap())
            .collect()
    }
}
