use chrono::{DateTime, Duration, Utc};
use lib_ai::{ProviderKind, Role};
use lib_utils::truncate_with_ellipsis;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Title some clients send for a chat that has not been named yet.
pub const TITLE_PLACEHOLDER: &str = "New Chat";

/// Characters of the first message kept in an automatic title.
pub const AUTO_TITLE_CHARS: usize = 50;

/// Title derived from the first user message.
pub fn auto_title(content: &str) -> String {
    truncate_with_ellipsis(content, AUTO_TITLE_CHARS)
}

/// Normalize an optional caller-supplied value: blank counts as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// region: --- Chat

/// Chat session record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Chat {
    pub id: i64,
    pub title: Option<String>,
    pub model_provider: Option<String>,
    pub model_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Chat {
    /// Whether the chat carries a real title (not empty, not the placeholder).
    pub fn has_title(&self) -> bool {
        self.title
            .as_deref()
            .map(str::trim)
            .is_some_and(|t| !t.is_empty() && t != TITLE_PLACEHOLDER)
    }

    pub fn effective_provider(&self) -> &str {
        self.model_provider
            .as_deref()
            .unwrap_or(ProviderKind::default().id())
    }

    /// Stored model, or the default model of the chat's provider.
    pub fn effective_model(&self) -> &str {
        let kind = self.effective_provider().parse::<ProviderKind>().unwrap_or_default();
        self.model_for(kind)
    }

    /// Model to send to `kind`: the stored one when it was chosen for that
    /// provider, otherwise the provider's default.
    pub fn model_for(&self, kind: ProviderKind) -> &str {
        let same_provider = self.effective_provider().parse::<ProviderKind>().ok() == Some(kind);
        match self.model_name.as_deref() {
            Some(model) if same_provider => model,
            _ => kind.default_model(),
        }
    }

    /// Most recent activity: last update, or creation when never updated.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Timestamp for the next activity, strictly later than the last one
    /// even when the clock has not advanced.
    pub fn next_activity_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.last_activity() + Duration::microseconds(1);
        now.max(floor)
    }
}

/// Data structure for creating a new chat.
///
/// `None` fields stay unset and fall back to the defaults when read.
#[derive(Debug, Clone, Default)]
pub struct ChatForCreate {
    pub title: Option<String>,
    pub model_provider: Option<String>,
    pub model_name: Option<String>,
}

impl ChatForCreate {
    pub fn new(
        title: Option<String>,
        model_provider: Option<String>,
        model_name: Option<String>,
    ) -> Self {
        Self {
            title: non_blank(title),
            model_provider: non_blank(model_provider),
            model_name: non_blank(model_name),
        }
    }
}

/// Chat row joined with its message count.
#[derive(Debug, Clone, FromRow)]
pub struct ChatWithCount {
    #[sqlx(flatten)]
    pub chat: Chat,
    pub message_count: i64,
}

// endregion: --- Chat

// region: --- Message

/// Author of a persisted message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MessageRole {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(format!("Invalid message role: {}", s)),
        }
    }
}

impl From<MessageRole> for Role {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => Role::User,
            MessageRole::Assistant => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    #[sqlx(try_from = "String")]
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// endregion: --- Message

// region: --- File

/// Uploaded file with its extracted text.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct FileAttachment {
    pub id: i64,
    pub chat_id: i64,
    /// Stored name: UUID plus the original extension.
    pub filename: String,
    pub original_filename: String,
    /// Lower-case extension without the dot, or `unknown`.
    pub file_type: String,
    /// Size of the upload in bytes.
    pub file_size: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileForCreate {
    pub chat_id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub content: String,
}

// endregion: --- File
