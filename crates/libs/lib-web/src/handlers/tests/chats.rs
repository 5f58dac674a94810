//! # Chat Endpoint Tests

use super::*;
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_chat() {
    let app = TestApp::new(Vec::new()).await;

    let (status, chat) = app
        .post_json("/api/chats", json!({ "title": "Plans", "model_provider": "xai", "model_name": "grok-3" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat["title"], "Plans");
    assert_eq!(chat["model_provider"], "xai");
    assert_eq!(chat["messages"], json!([]));

    let id = chat["id"].as_i64().unwrap();
    let (status, fetched) = app.get(&format!("/api/chats/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["model_name"], "grok-3");
}

#[tokio::test]
async fn test_create_chat_defaults() {
    let app = TestApp::new(Vec::new()).await;

    let (status, chat) = app.post_json("/api/chats", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat["title"], Value::Null);
    assert_eq!(chat["model_provider"], "openai");
    assert_eq!(chat["model_name"], "gpt-3.5-turbo");
}

#[tokio::test]
async fn test_create_chat_rejects_unknown_provider() {
    let app = TestApp::new(Vec::new()).await;

    let (status, body) = app
        .post_json("/api/chats", json!({ "model_provider": "anthropic" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UnsupportedProvider");
    assert_eq!(body["error"], "Unsupported provider: anthropic");
}

#[tokio::test]
async fn test_list_chats_newest_activity_first() {
    let fake = Arc::new(FakeProvider::replying(lib_ai::ProviderKind::OpenAi, "ok"));
    let app = TestApp::new(vec![fake]).await;

    let older = app.create_chat(json!({ "title": "older" })).await;
    let newer = app.create_chat(json!({ "title": "newer" })).await;

    let (_, chats) = app.get("/api/chats").await;
    let ids: Vec<i64> = chats.as_array().unwrap().iter().map(|c| c["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![newer, older]);

    // Activity on the older chat moves it to the top.
    let (status, _) = app
        .post_json(
            &format!("/api/chats/{}/messages", older),
            json!({ "content": "bump", "provider": "openai" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, chats) = app.get("/api/chats").await;
    let first = &chats.as_array().unwrap()[0];
    assert_eq!(first["id"].as_i64(), Some(older));
    assert_eq!(first["message_count"], 2);
}

#[tokio::test]
async fn test_get_missing_chat() {
    let app = TestApp::new(Vec::new()).await;

    let (status, body) = app.get("/api/chats/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Chat not found");
    assert_eq!(body["code"], "NotFound");
}

#[tokio::test]
async fn test_delete_chat_cascades() {
    let fake = Arc::new(FakeProvider::replying(lib_ai::ProviderKind::OpenAi, "ok"));
    let app = TestApp::new(vec![fake]).await;
    let id = app.create_chat(json!({})).await;
    app.post_json(
        &format!("/api/chats/{}/messages", id),
        json!({ "content": "hi", "provider": "openai" }),
    )
    .await;

    let (status, body) = app.delete(&format!("/api/chats/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chat deleted successfully");

    let count = lib_core::model::store::MessageRepository::count_for_chat(&app.db, id)
        .await
        .unwrap();
    assert_eq!(count, 0);

    let (status, _) = app.delete(&format!("/api/chats/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_messages_in_order() {
    let fake = Arc::new(FakeProvider::replying(lib_ai::ProviderKind::OpenAi, "answer"));
    let app = TestApp::new(vec![fake]).await;
    let id = app.create_chat(json!({})).await;
    app.post_json(
        &format!("/api/chats/{}/messages", id),
        json!({ "content": "question", "provider": "openai" }),
    )
    .await;

    let (status, messages) = app.get(&format!("/api/chats/{}/messages", id)).await;
    assert_eq!(status, StatusCode::OK);
    let roles: Vec<&str> = messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["user", "assistant"]);

    let (status, _) = app.get("/api/chats/999/messages").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
