//! # File Handlers
//!
//! Attach documents to a chat. Their extracted text is injected as context
//! into every later prompt of that chat.
//!
//! ```bash
//! curl -F "file=@notes.pdf" http://localhost:8000/api/chats/1/files
//! ```

use crate::services::FileService;
use crate::services::files::file_too_large;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use lib_core::dto::{FileListResponse, FileResponse, StatusMessage};
use lib_core::AppError;
use tracing::{info, warn};

const FILE_FIELD: &str = "file";

/// **Route**: `POST /api/chats/{chat_id}/files`
///
/// Reads the first multipart field named `file`; other fields are skipped.
pub async fn upload_file(
    State(service): State<FileService>,
    Path(chat_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<FileResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(upload_error)?;

        info!(
            "[FILES] Upload to chat {}: {} ({} bytes)",
            chat_id,
            filename,
            bytes.len()
        );
        let file = service.upload(chat_id, &filename, bytes.to_vec()).await?;
        return Ok(Json(file));
    }

    warn!("[FILES] Upload to chat {} without a \"{}\" field", chat_id, FILE_FIELD);
    Err(AppError::InvalidInput("No file provided".to_string()))
}

/// Body limit hits surface as the same message as an oversized file.
fn upload_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large();
    }
    AppError::InvalidInput(format!("Malformed upload: {}", err.body_text()))
}

/// **Route**: `GET /api/chats/{chat_id}/files`
pub async fn list_files(
    State(service): State<FileService>,
    Path(chat_id): Path<i64>,
) -> Result<Json<FileListResponse>, AppError> {
    let files = service.list(chat_id).await?;
    Ok(Json(FileListResponse { files }))
}

/// **Route**: `DELETE /api/chats/{chat_id}/files/{file_id}`
pub async fn delete_file(
    State(service): State<FileService>,
    Path((chat_id, file_id)): Path<(i64, i64)>,
) -> Result<Json<StatusMessage>, AppError> {
    service.delete(chat_id, file_id).await?;
    Ok(Json(StatusMessage::new("File deleted successfully")))
}
