//! # Streaming Relay
//!
//! Forwards provider fragments to the caller while buffering the full reply.
//! A spawned task owns the provider stream and pushes [`StreamEvent`]s into a
//! bounded channel whose receiver backs the HTTP response body.
//!
//! Exactly one terminal event is sent: `done` once the reply is persisted,
//! or `error` when the provider or persistence fails. If the receiver is
//! dropped (client disconnected) the task stops polling the provider, drops
//! its stream and discards the partial text.

use super::chat::{ChatService, PreparedExchange};
use futures_util::StreamExt;
use lib_core::{AppError, StreamFailurePolicy};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Buffered events between the relay task and the response body.
const CHANNEL_CAPACITY: usize = 32;

/// One SSE frame payload. Serializes to exactly one of
/// `{"content": ..}`, `{"done": true}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Content { content: String },
    Done { done: bool },
    Error { error: String },
}

impl StreamEvent {
    pub fn content(text: impl Into<String>) -> Self {
        StreamEvent::Content { content: text.into() }
    }

    pub fn done() -> Self {
        StreamEvent::Done { done: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error { error: message.into() }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Content { .. })
    }
}

enum RelayOutcome {
    Completed(String),
    Cancelled,
}

/// Spawn the relay task for a prepared exchange.
pub(crate) fn spawn_relay(service: ChatService, exchange: PreparedExchange) -> mpsc::Receiver<StreamEvent> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(async move {
        run_relay(service, exchange, tx).await;
    });
    rx
}

async fn run_relay(service: ChatService, exchange: PreparedExchange, tx: mpsc::Sender<StreamEvent>) {
    let chat_id = exchange.chat.id;

    let outcome = relay_fragments(&exchange, &tx).await;
    let failure = match outcome {
        Ok(RelayOutcome::Cancelled) => {
            info!(chat_id, "Client disconnected, partial reply discarded");
            return;
        }
        Ok(RelayOutcome::Completed(text)) => match service.persist_reply(&exchange, &text).await {
            Ok(_) => {
                let _ = tx.send(StreamEvent::done()).await;
                return;
            }
            Err(err) => err,
        },
        Err(err) => err,
    };

    let policy = service.stream_failure_policy();
    warn!(chat_id, policy = %policy, error = %failure, "Streamed exchange failed");

    let mut message = failure.user_message();
    if policy == StreamFailurePolicy::Compensate {
        if let Err(delete_err) = service.remove_user_message(exchange.user_message.id).await {
            error!(chat_id, error = %delete_err, "Compensating delete failed");
            message = delete_err.user_message();
        }
    }

    let _ = tx.send(StreamEvent::error(message)).await;
}

/// Pull fragments until the provider finishes, fails, or the consumer leaves.
async fn relay_fragments(
    exchange: &PreparedExchange,
    tx: &mpsc::Sender<StreamEvent>,
) -> Result<RelayOutcome, AppError> {
    info!(
        provider = exchange.provider_kind.id(),
        model = %exchange.model,
        "Opening provider stream"
    );

    let mut fragments = tokio::select! {
        _ = tx.closed() => return Ok(RelayOutcome::Cancelled),
        opened = exchange.provider.stream(&exchange.turns, &exchange.model, exchange.modes) => opened?,
    };

    let mut reply = String::new();
    loop {
        tokio::select! {
            _ = tx.closed() => return Ok(RelayOutcome::Cancelled),
            next = fragments.next() => match next {
                Some(Ok(fragment)) => {
                    reply.push_str(&fragment);
                    if tx.send(StreamEvent::content(fragment)).await.is_err() {
                        return Ok(RelayOutcome::Cancelled);
                    }
                }
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
        }
    }

    Ok(RelayOutcome::Completed(reply))
}
