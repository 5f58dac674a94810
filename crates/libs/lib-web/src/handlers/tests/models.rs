//! # Model Listing Tests

use super::*;
use lib_ai::ProviderKind;

#[tokio::test]
async fn test_lists_models_of_registered_provider() {
    let fake = Arc::new(FakeProvider::replying(ProviderKind::Xai, ""));
    let app = TestApp::new(vec![fake]).await;

    let (status, body) = app.get("/api/chats/available-models/xai").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"][0]["id"], "fake-1");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_provider_id_is_case_insensitive() {
    let fake = Arc::new(FakeProvider::replying(ProviderKind::OpenAi, ""));
    let app = TestApp::new(vec![fake]).await;

    let (status, body) = app.get("/api/chats/available-models/OpenAI").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unconfigured_provider_reports_error_string() {
    let fake = Arc::new(FakeProvider::unconfigured(ProviderKind::Xai));
    let app = TestApp::new(vec![fake]).await;

    let (status, body) = app.get("/api/chats/available-models/xai").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"], serde_json::json!([]));
    assert_eq!(body["error"], "xAI API key not configured");
}

#[tokio::test]
async fn test_unsupported_provider_is_bad_request() {
    let app = TestApp::new(Vec::new()).await;

    let (status, body) = app.get("/api/chats/available-models/anthropic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported provider: anthropic");
}
