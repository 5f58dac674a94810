//! # Message Repository
//!
//! Database access for chat messages. Conversation order is creation time
//! ascending with ties broken by id.

use super::models::{Message, MessageRole};
use chrono::{DateTime, Utc};
use sqlx::{query_as, Executor, Sqlite};

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create<'e, E>(
        executor: E,
        chat_id: i64,
        role: MessageRole,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Message, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, Message>(
            "INSERT INTO messages (chat_id, role, content, created_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(chat_id)
        .bind(role.as_str())
        .bind(content)
        .bind(created_at)
        .fetch_one(executor)
        .await
    }

    /// Messages of a chat in conversation order.
    pub async fn list_for_chat<'e, E>(executor: E, chat_id: i64) -> Result<Vec<Message>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, Message>(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id)
        .fetch_all(executor)
        .await
    }

    pub async fn count_for_chat<'e, E>(executor: E, chat_id: i64) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(executor)
            .await
    }

    /// Delete one message. Returns rows removed.
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
