//! # Chat Data Transfer Objects
//!
//! Request and response structures for the chat endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `GET /api/chats` -> `Vec<`[`ChatSummary`]`>`
//! - `POST /api/chats` - [`CreateChatRequest`] -> [`ChatDetail`]
//! - `GET /api/chats/{id}` -> [`ChatDetail`]
//! - `POST /api/chats/{id}/messages` - [`SendMessageRequest`] -> [`SendMessageResponse`]
//! - `GET /api/chats/available-models/{provider}` -> [`ModelsResponse`]
//!
//! ## Wire Format
//!
//! Field names are **snake_case** except the mode flags of
//! [`SendMessageRequest`], which keep the browser client's camelCase names:
//!
//! ```text
//! POST /api/chats/7/messages
//! {
//!   "content": "What is in this file?",
//!   "provider": "xai",
//!   "model": "grok-3",
//!   "thinkingMode": true,
//!   "deepResearchMode": false
//! }
//! ```

use crate::model::store::{Chat, ChatWithCount, Message};
use chrono::{DateTime, Utc};
use lib_ai::{ModeFlags, ModelInfo};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chats`. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model_provider: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Chat listing entry with effective provider/model and message count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSummary {
    pub id: i64,
    pub title: Option<String>,
    pub model_provider: String,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub message_count: i64,
}

impl ChatSummary {
    pub fn new(chat: &Chat, message_count: i64) -> Self {
        Self {
            id: chat.id,
            title: chat.title.clone(),
            model_provider: chat.effective_provider().to_string(),
            model_name: chat.effective_model().to_string(),
            created_at: chat.created_at,
            updated_at: chat.updated_at,
            message_count,
        }
    }
}

impl From<ChatWithCount> for ChatSummary {
    fn from(row: ChatWithCount) -> Self {
        Self::new(&row.chat, row.message_count)
    }
}

/// Chat with its ordered messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDetail {
    pub id: i64,
    pub title: Option<String>,
    pub model_provider: String,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub messages: Vec<Message>,
}

impl ChatDetail {
    pub fn new(chat: Chat, messages: Vec<Message>) -> Self {
        Self {
            model_provider: chat.effective_provider().to_string(),
            model_name: chat.effective_model().to_string(),
            id: chat.id,
            title: chat.title,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
            messages,
        }
    }
}

/// Body of the send-message endpoints.
///
/// `provider` and `model` fall back to the chat's settings, then to the
/// defaults, when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(rename = "thinkingMode", default)]
    pub thinking_mode: bool,
    #[serde(rename = "deepResearchMode", default)]
    pub deep_research_mode: bool,
}

impl SendMessageRequest {
    pub fn modes(&self) -> ModeFlags {
        ModeFlags::new(self.thinking_mode, self.deep_research_mode)
    }
}

/// Result of a completed (non-streaming) exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: Message,
    pub assistant_response: Message,
    pub chat: ChatSummary,
}

/// Model listing. `error` is set when the list could not be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Plain acknowledgement body, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
