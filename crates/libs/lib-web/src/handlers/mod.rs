//! # HTTP Request Handlers
//!
//! Axum handlers organized by feature domain. Handlers extract path, body
//! and state, delegate to [`crate::services`] and map results to JSON.
//!
//! ## Handler Modules
//!
//! - **[`chats`]**: Chat session endpoints
//!   - `GET /api/chats` - List chat summaries, newest activity first
//!   - `POST /api/chats` - Create a chat
//!   - `GET /api/chats/{chat_id}` - Chat with ordered messages
//!   - `DELETE /api/chats/{chat_id}` - Delete a chat and everything in it
//!   - `GET /api/chats/{chat_id}/messages` - Ordered messages
//!
//! - **[`messages`]**: Message exchange endpoints
//!   - `POST /api/chats/{chat_id}/messages` - Send and wait for the full reply
//!   - `POST /api/chats/{chat_id}/messages/stream` - Send and stream the reply (SSE)
//!
//! - **[`models`]**: Model listing
//!   - `GET /api/chats/available-models/{provider}`
//!
//! - **[`files`]**: Context file attachments
//!   - `POST /api/chats/{chat_id}/files` - Multipart upload (`file` field)
//!   - `GET /api/chats/{chat_id}/files` - List attachments
//!   - `DELETE /api/chats/{chat_id}/files/{file_id}` - Remove an attachment
//!
//! ## Error Handling
//!
//! Handlers return `Result<T, AppError>`. [`lib_core::AppError`] implements
//! `IntoResponse` and renders `{"error": message, "code": variant}` with the
//! matching status code:
//!
//! ```rust,ignore
//! pub async fn get_chat(
//!     State(db): State<DbPool>,
//!     Path(chat_id): Path<i64>,
//! ) -> Result<Json<ChatDetail>, AppError> {
//!     let chat = ChatRepository::find_by_id(&db, chat_id)
//!         .await?
//!         .ok_or_else(AppError::chat_not_found)?;
//!     // ...
//! }
//! ```
//!
//! ## Request/Response Flow
//!
//! ```text
//! Client Request
//!     ↓
//! CORS Middleware (tower-http)
//!     ↓
//! Request stamping → Trace span → Request logging
//!     ↓
//! Handler → Service → Repository / Provider Client
//!     ↓
//! Client Response (JSON or SSE)
//! ```

pub mod chats;
pub mod files;
pub mod messages;
pub mod models;

#[cfg(test)]
mod tests;
