//! # Chat Service
//!
//! Message exchange orchestration: every inbound message is persisted, turned
//! into a prompt with the chat's history and attached files, and sent to the
//! selected provider. The reply is persisted together with the chat's
//! metadata, or the user message is removed again when the exchange fails.
//!
//! ```text
//! validate provider → resolve chat → save user message → compose prompt
//!     → provider.complete() → [tx: save reply + update chat]
//!                           ↘ on failure: delete user message
//! ```
//!
//! The streaming variant shares the preparation steps and hands the
//! provider call to [`super::stream`].

use super::prompt::PromptComposer;
use super::stream::{self, StreamEvent};
use chrono::{Duration, Utc};
use lib_ai::{ChatProvider, ChatTurn, ModeFlags, ProviderError, ProviderKind, ProviderRegistry};
use lib_core::dto::{ChatSummary, SendMessageRequest, SendMessageResponse};
use lib_core::model::store::models::{auto_title, non_blank};
use lib_core::model::store::{
    Chat, ChatForCreate, ChatRepository, FileRepository, Message, MessageRepository, MessageRole,
};
use lib_core::{AppError, Config, DbPool, Result, StreamFailurePolicy};
use lib_utils::validate_not_empty;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Everything resolved before the provider is invoked.
pub(crate) struct PreparedExchange {
    pub chat: Chat,
    pub user_message: Message,
    pub provider: Arc<dyn ChatProvider>,
    pub provider_kind: ProviderKind,
    pub model: String,
    pub modes: ModeFlags,
    pub turns: Vec<ChatTurn>,
}

#[derive(Clone)]
pub struct ChatService {
    db: DbPool,
    providers: Arc<ProviderRegistry>,
    composer: PromptComposer,
    auto_create_chats: bool,
    stream_failure_policy: StreamFailurePolicy,
}

impl ChatService {
    pub fn new(db: DbPool, providers: Arc<ProviderRegistry>, config: &Config) -> Self {
        Self {
            db,
            providers,
            composer: PromptComposer::new(config.mode_prompt_prefix),
            auto_create_chats: config.auto_create_chats,
            stream_failure_policy: config.stream_failure_policy,
        }
    }

    /// Run a full request/response exchange.
    #[instrument(skip(self, req), fields(provider = ?req.provider, model = ?req.model))]
    pub async fn send_message(&self, chat_id: i64, req: &SendMessageRequest) -> Result<SendMessageResponse> {
        let exchange = self.prepare(chat_id, req).await?;
        let user_message_id = exchange.user_message.id;

        match self.complete_exchange(&exchange).await {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!(chat_id = exchange.chat.id, error = %err, "Exchange failed, removing user message");
                self.remove_user_message(user_message_id).await?;
                Err(err)
            }
        }
    }

    /// Start a streamed exchange.
    ///
    /// Preparation errors are returned directly. Once this returns, the
    /// outcome is reported through the events on the receiver.
    #[instrument(skip(self, req), fields(provider = ?req.provider, model = ?req.model))]
    pub async fn stream_message(
        &self,
        chat_id: i64,
        req: &SendMessageRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>> {
        let exchange = self.prepare(chat_id, req).await?;
        Ok(stream::spawn_relay(self.clone(), exchange))
    }

    pub(crate) fn stream_failure_policy(&self) -> StreamFailurePolicy {
        self.stream_failure_policy
    }

    // region: --- Exchange Steps

    /// Validate the provider, resolve the chat, store the user message and
    /// build the outbound conversation.
    ///
    /// Nothing is written until the provider is known to be usable.
    pub(crate) async fn prepare(&self, chat_id: i64, req: &SendMessageRequest) -> Result<PreparedExchange> {
        validate_not_empty(&req.content, "Message content").map_err(AppError::InvalidInput)?;

        let requested_kind = non_blank(req.provider.clone())
            .map(|id| id.parse::<ProviderKind>())
            .transpose()?;
        let requested_model = non_blank(req.model.clone());

        let existing = ChatRepository::find_by_id(&self.db, chat_id).await?;
        if existing.is_none() && !self.auto_create_chats {
            return Err(AppError::chat_not_found());
        }

        let provider_kind = match (requested_kind, &existing) {
            (Some(kind), _) => kind,
            (None, Some(chat)) => chat.effective_provider().parse::<ProviderKind>()?,
            (None, None) => ProviderKind::default(),
        };
        let provider = self.providers.get(provider_kind)?;
        if !provider.is_configured() {
            return Err(ProviderError::Unconfigured { provider: provider_kind }.into());
        }

        let model = match (requested_model, &existing) {
            (Some(model), _) => model,
            (None, Some(chat)) => chat.model_for(provider_kind).to_string(),
            (None, None) => provider_kind.default_model().to_string(),
        };
        let modes = req.modes();

        let chat = match existing {
            Some(chat) => chat,
            None => {
                let data = ChatForCreate::new(
                    Some(auto_title(&req.content)),
                    Some(provider_kind.id().to_string()),
                    Some(model.clone()),
                );
                let chat = ChatRepository::create(&self.db, &data, Utc::now()).await?;
                info!(requested_id = chat_id, chat_id = chat.id, "Created chat for incoming message");
                chat
            }
        };

        let user_message =
            MessageRepository::create(&self.db, chat.id, MessageRole::User, &req.content, Utc::now()).await?;
        info!(chat_id = chat.id, message_id = user_message.id, "Saved user message");

        match self.build_turns(&chat, &user_message, modes).await {
            Ok(turns) => Ok(PreparedExchange {
                chat,
                user_message,
                provider,
                provider_kind,
                model,
                modes,
                turns,
            }),
            Err(err) => {
                self.remove_user_message(user_message.id).await?;
                Err(err)
            }
        }
    }

    /// Ordered history with the newest user turn replaced by the composed prompt.
    async fn build_turns(&self, chat: &Chat, user_message: &Message, modes: ModeFlags) -> Result<Vec<ChatTurn>> {
        let history = MessageRepository::list_for_chat(&self.db, chat.id).await?;
        let files = FileRepository::list_for_chat(&self.db, chat.id).await?;
        let composed = self.composer.compose(&user_message.content, &files, modes);

        let turns = history
            .into_iter()
            .map(|m| {
                let content = if m.id == user_message.id {
                    composed.prompt.clone()
                } else {
                    m.content
                };
                ChatTurn {
                    role: m.role.into(),
                    content,
                }
            })
            .collect::<Vec<_>>();

        info!(
            chat_id = chat.id,
            turns = turns.len(),
            files = files.len(),
            "Built conversation"
        );
        Ok(turns)
    }

    async fn complete_exchange(&self, exchange: &PreparedExchange) -> Result<SendMessageResponse> {
        info!(
            provider = exchange.provider_kind.id(),
            model = %exchange.model,
            "Calling provider"
        );
        let reply = exchange
            .provider
            .complete(&exchange.turns, &exchange.model, exchange.modes)
            .await?;

        let (assistant_message, chat) = self.persist_reply(exchange, &reply).await?;
        let message_count = MessageRepository::count_for_chat(&self.db, chat.id).await?;

        Ok(SendMessageResponse {
            message: exchange.user_message.clone(),
            assistant_response: assistant_message,
            chat: ChatSummary::new(&chat, message_count),
        })
    }

    /// Store the assistant reply and update chat metadata in one transaction.
    pub(crate) async fn persist_reply(&self, exchange: &PreparedExchange, reply: &str) -> Result<(Message, Chat)> {
        let now = Utc::now();
        let reply_at = now.max(exchange.user_message.created_at + Duration::microseconds(1));
        let updated_at = exchange.chat.next_activity_at(reply_at);
        let title = auto_title(&exchange.user_message.content);

        let mut tx = self.db.begin().await?;
        let assistant_message =
            MessageRepository::create(&mut *tx, exchange.chat.id, MessageRole::Assistant, reply, reply_at).await?;
        let chat = ChatRepository::record_activity(
            &mut *tx,
            exchange.chat.id,
            Some(title.as_str()),
            Some(exchange.provider_kind.id()),
            Some(exchange.model.as_str()),
            updated_at,
        )
        .await?;
        tx.commit().await?;

        info!(
            chat_id = chat.id,
            message_id = assistant_message.id,
            chars = reply.chars().count(),
            "Saved assistant reply"
        );
        Ok((assistant_message, chat))
    }

    /// Compensating delete for a failed exchange.
    pub(crate) async fn remove_user_message(&self, message_id: i64) -> Result<()> {
        match MessageRepository::delete(&self.db, message_id).await {
            Ok(_) => {
                info!(message_id, "Removed user message after failure");
                Ok(())
            }
            Err(e) => {
                error!(message_id, error = %e, "Failed to remove user message after failure");
                Err(AppError::Persistence(format!(
                    "compensating delete of message {} failed: {}",
                    message_id, e
                )))
            }
        }
    }

    // endregion: --- Exchange Steps
}
