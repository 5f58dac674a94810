//! # File Data Transfer Objects
//!
//! - `POST /api/chats/{id}/files` (multipart, `file` field) -> [`FileResponse`]
//! - `GET /api/chats/{id}/files` -> [`FileListResponse`]
//!
//! Extracted text stays server-side; responses only carry metadata.

use crate::model::store::FileAttachment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileResponse {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FileAttachment> for FileResponse {
    fn from(file: FileAttachment) -> Self {
        Self {
            id: file.id,
            filename: file.filename,
            original_filename: file.original_filename,
            file_type: file.file_type,
            file_size: file.file_size,
            created_at: file.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
}
