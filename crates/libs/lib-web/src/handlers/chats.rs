//! # Chat Handlers
//!
//! CRUD endpoints for chat sessions and their message history.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use lib_core::dto::{ChatDetail, ChatSummary, CreateChatRequest, StatusMessage};
use lib_ai::ProviderKind;
use lib_core::model::store::models::non_blank;
use lib_core::model::store::{ChatForCreate, ChatRepository, Message, MessageRepository};
use lib_core::{AppError, DbPool};
use tracing::{info, instrument};

/// **Route**: `GET /api/chats`
pub async fn list_chats(State(db): State<DbPool>) -> Result<Json<Vec<ChatSummary>>, AppError> {
    let chats = ChatRepository::list_with_counts(&db).await?;
    Ok(Json(chats.into_iter().map(ChatSummary::from).collect()))
}

/// **Route**: `POST /api/chats`
///
/// Blank fields are stored as absent; provider and model fall back to the
/// defaults when the chat is read. A provider outside the supported set is
/// rejected up front instead of failing every later message.
#[instrument(skip(db, req))]
pub async fn create_chat(
    State(db): State<DbPool>,
    Json(req): Json<CreateChatRequest>,
) -> Result<Json<ChatDetail>, AppError> {
    let provider = non_blank(req.model_provider)
        .map(|id| id.parse::<ProviderKind>().map(|kind| kind.id().to_string()))
        .transpose()?;

    let data = ChatForCreate::new(req.title, provider, req.model_name);
    let chat = ChatRepository::create(&db, &data, Utc::now()).await?;
    info!("[CHATS] Created chat {}", chat.id);

    Ok(Json(ChatDetail::new(chat, Vec::new())))
}

/// **Route**: `GET /api/chats/{chat_id}`
pub async fn get_chat(
    State(db): State<DbPool>,
    Path(chat_id): Path<i64>,
) -> Result<Json<ChatDetail>, AppError> {
    let chat = ChatRepository::find_by_id(&db, chat_id)
        .await?
        .ok_or_else(AppError::chat_not_found)?;
    let messages = MessageRepository::list_for_chat(&db, chat_id).await?;
    Ok(Json(ChatDetail::new(chat, messages)))
}

/// **Route**: `DELETE /api/chats/{chat_id}`
///
/// Messages and attachments go with the chat.
pub async fn delete_chat(
    State(db): State<DbPool>,
    Path(chat_id): Path<i64>,
) -> Result<Json<StatusMessage>, AppError> {
    if ChatRepository::delete(&db, chat_id).await? == 0 {
        return Err(AppError::chat_not_found());
    }
    info!("[CHATS] Deleted chat {}", chat_id);
    Ok(Json(StatusMessage::new("Chat deleted successfully")))
}

/// **Route**: `GET /api/chats/{chat_id}/messages`
pub async fn list_messages(
    State(db): State<DbPool>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Vec<Message>>, AppError> {
    if ChatRepository::find_by_id(&db, chat_id).await?.is_none() {
        return Err(AppError::chat_not_found());
    }
    Ok(Json(MessageRepository::list_for_chat(&db, chat_id).await?))
}
