//! # Handler Tests
//!
//! Drive the full router (middleware included) with `tower::ServiceExt::oneshot`
//! against an in-memory database and scripted providers.

mod chats;
mod models;

use crate::server::{create_router, AppState};
use crate::services::test_support::{test_state, FakeProvider};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_core::{Config, DbPool};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Router plus a handle on its database.
pub struct TestApp {
    pub router: Router,
    pub db: DbPool,
}

impl TestApp {
    pub async fn new(providers: Vec<Arc<FakeProvider>>) -> Self {
        Self::with_config(Config::default(), providers).await
    }

    pub async fn with_config(config: Config, providers: Vec<Arc<FakeProvider>>) -> Self {
        let state: AppState = test_state(config, providers).await;
        let db = state.db.clone();
        Self {
            router: create_router(state, Vec::new()),
            db,
        }
    }

    /// Send a request and return status plus raw body.
    pub async fn raw(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    /// Send a request and parse the body as JSON.
    pub async fn call(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.raw(req).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.call(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(json_request(uri, body)).await
    }

    /// Create a chat through the API and return its id.
    pub async fn create_chat(&self, body: Value) -> i64 {
        let (status, chat) = self.post_json("/api/chats", body).await;
        assert_eq!(status, StatusCode::OK);
        chat["id"].as_i64().unwrap()
    }
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health_and_root() {
    let app = TestApp::new(Vec::new()).await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "AI Chat API is running");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new(Vec::new()).await;
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new(Vec::new()).await;
    let (status, _) = app.raw(Request::builder().uri("/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
