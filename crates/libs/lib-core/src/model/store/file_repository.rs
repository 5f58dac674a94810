//! # File Repository
//!
//! Database access for uploaded context files.

use super::models::{FileAttachment, FileForCreate};
use chrono::{DateTime, Utc};
use sqlx::{query_as, Executor, Sqlite};

pub struct FileRepository;

impl FileRepository {
    pub async fn create<'e, E>(
        executor: E,
        data: &FileForCreate,
        created_at: DateTime<Utc>,
    ) -> Result<FileAttachment, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, FileAttachment>(
            "INSERT INTO file_uploads \
               (chat_id, filename, original_filename, file_type, file_size, content, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.chat_id)
        .bind(&data.filename)
        .bind(&data.original_filename)
        .bind(&data.file_type)
        .bind(data.file_size)
        .bind(&data.content)
        .bind(created_at)
        .fetch_one(executor)
        .await
    }

    /// Files of a chat in upload order.
    pub async fn list_for_chat<'e, E>(
        executor: E,
        chat_id: i64,
    ) -> Result<Vec<FileAttachment>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, FileAttachment>(
            "SELECT * FROM file_uploads WHERE chat_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id)
        .fetch_all(executor)
        .await
    }

    /// Delete a file that belongs to `chat_id`. Returns rows removed.
    pub async fn delete<'e, E>(executor: E, chat_id: i64, file_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM file_uploads WHERE id = ? AND chat_id = ?")
            .bind(file_id)
            .bind(chat_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
