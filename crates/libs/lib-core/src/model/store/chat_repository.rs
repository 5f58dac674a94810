//! # Chat Repository
//!
//! Database access for chat sessions.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_memory_pool, ChatForCreate, ChatRepository};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_memory_pool().await?;
//! let chat = ChatRepository::create(&pool, &ChatForCreate::default(), chrono::Utc::now()).await?;
//! let found = ChatRepository::find_by_id(&pool, chat.id).await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

use super::models::{Chat, ChatForCreate, ChatWithCount, TITLE_PLACEHOLDER};
use chrono::{DateTime, Utc};
use sqlx::{query_as, Executor, Sqlite};

const SELECT_WITH_COUNT: &str = "SELECT c.*, \
     (SELECT COUNT(*) FROM messages m WHERE m.chat_id = c.id) AS message_count \
     FROM chats c";

/// Chat repository for database operations.
pub struct ChatRepository;

impl ChatRepository {
    /// Insert a chat and return the stored row.
    pub async fn create<'e, E>(
        executor: E,
        data: &ChatForCreate,
        created_at: DateTime<Utc>,
    ) -> Result<Chat, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, Chat>(
            "INSERT INTO chats (title, model_provider, model_name, created_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.model_provider)
        .bind(&data.model_name)
        .bind(created_at)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Chat>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, Chat>("SELECT * FROM chats WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All chats with message counts, most recent activity first.
    pub async fn list_with_counts<'e, E>(executor: E) -> Result<Vec<ChatWithCount>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, ChatWithCount>(&format!(
            "{} ORDER BY COALESCE(c.updated_at, c.created_at) DESC, c.id DESC",
            SELECT_WITH_COUNT
        ))
        .fetch_all(executor)
        .await
    }

    /// Record a completed exchange on the chat.
    ///
    /// `title`, `provider` and `model` only fill fields that are still unset;
    /// `updated_at` is always replaced.
    pub async fn record_activity<'e, E>(
        executor: E,
        id: i64,
        title: Option<&str>,
        provider: Option<&str>,
        model: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Chat, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, Chat>(
            "UPDATE chats SET \
               title = CASE \
                 WHEN title IS NULL OR TRIM(title) = '' OR title = ? THEN COALESCE(?, title) \
                 ELSE title END, \
               model_provider = COALESCE(model_provider, ?), \
               model_name = COALESCE(model_name, ?), \
               updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(TITLE_PLACEHOLDER)
        .bind(title)
        .bind(provider)
        .bind(model)
        .bind(updated_at)
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Delete a chat; messages and files go with it. Returns rows removed.
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
