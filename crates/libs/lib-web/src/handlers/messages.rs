//! # Message Handlers
//!
//! Send a user message and receive the assistant reply, either as one JSON
//! document or as a Server-Sent Events stream.
//!
//! ## Stream Format
//!
//! Every SSE `data:` line holds one JSON object with exactly one key:
//!
//! ```text
//! data: {"content":"He"}
//!
//! data: {"content":"llo"}
//!
//! data: {"done":true}
//! ```
//!
//! A failure after the stream opened ends with `data: {"error":"..."}`
//! instead of `done`. Failures before that (unknown chat, unsupported
//! provider, empty content) are ordinary JSON error responses.

use crate::services::{ChatService, StreamEvent};
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::{Stream, StreamExt};
use lib_core::dto::{SendMessageRequest, SendMessageResponse};
use lib_core::AppError;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

/// **Route**: `POST /api/chats/{chat_id}/messages`
///
/// Unknown chats are created on the fly when `AUTO_CREATE_CHATS` is on;
/// the response's `chat.id` is then the new chat's id.
pub async fn send_message(
    State(service): State<ChatService>,
    Path(chat_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    info!(
        "[MESSAGES] chat_id={} provider={:?} model={:?}",
        chat_id, req.provider, req.model
    );
    let response = service.send_message(chat_id, &req).await?;
    Ok(Json(response))
}

/// **Route**: `POST /api/chats/{chat_id}/messages/stream`
///
/// Closing the connection stops the provider stream; the partial reply is
/// not stored.
pub async fn stream_message(
    State(service): State<ChatService>,
    Path(chat_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    info!(
        "[MESSAGES] stream chat_id={} provider={:?} model={:?}",
        chat_id, req.provider, req.model
    );
    let events = service.stream_message(chat_id, &req).await?;

    let stream = ReceiverStream::new(events).map(|event: StreamEvent| Event::default().json_data(&event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
