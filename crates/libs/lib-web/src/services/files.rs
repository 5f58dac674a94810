//! # File Service
//!
//! Upload validation, text extraction and attachment bookkeeping.
//!
//! Only the extracted text is persisted; the uploaded bytes are discarded
//! once extraction finishes. Supported formats:
//!
//! | Extension | Extraction |
//! |-----------|------------|
//! | `.txt`, `.md` | UTF-8, falling back to Latin-1 |
//! | `.pdf` | `pdf-extract`, on the blocking pool |
//! | `.docx` | paragraph text of `word/document.xml` |

use chrono::Utc;
use lib_core::dto::FileResponse;
use lib_core::model::store::{ChatRepository, FileForCreate, FileRepository};
use lib_core::{AppError, DbPool, Result};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Largest accepted upload in bytes.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Extensions accepted for upload, without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md"];

const DOCX_BODY_PART: &str = "word/document.xml";

/// Lower-case extension without the dot, or `unknown`.
pub fn file_type(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn file_too_large() -> AppError {
    AppError::InvalidInput(format!(
        "File too large. Maximum size: {}MB",
        MAX_FILE_SIZE / (1024 * 1024)
    ))
}

/// Reject names, types and sizes that cannot be stored.
pub fn validate_upload(filename: &str, size: usize) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(AppError::InvalidInput("No filename provided".to_string()));
    }

    let kind = file_type(filename);
    if !ALLOWED_EXTENSIONS.contains(&kind.as_str()) {
        let allowed = ALLOWED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::InvalidInput(format!(
            "File type not allowed. Allowed types: {}",
            allowed
        )));
    }

    if size > MAX_FILE_SIZE {
        return Err(file_too_large());
    }

    Ok(())
}

// region: --- Text Extraction

/// Extract the plain text of an upload, trimmed.
pub async fn extract_text(filename: &str, bytes: Vec<u8>) -> Result<String> {
    let text = match file_type(filename).as_str() {
        "txt" | "md" => decode_text(&bytes),
        "pdf" => tokio::task::spawn_blocking(move || extract_pdf(&bytes))
            .await
            .map_err(|e| AppError::Internal(format!("PDF extraction task failed: {}", e)))??,
        "docx" => extract_docx(&bytes)?,
        other => {
            return Err(AppError::InvalidInput(format!("Unsupported file type: {}", other)));
        }
    };
    Ok(text.trim().to_string())
}

/// UTF-8 first; any byte sequence is valid Latin-1.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::InvalidInput(format!("Error extracting text from PDF: {}", e)))
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let docx_err = |e: &dyn std::fmt::Display| {
        AppError::InvalidInput(format!("Error extracting text from DOCX: {}", e))
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| docx_err(&e))?;
    let mut part = archive.by_name(DOCX_BODY_PART).map_err(|e| docx_err(&e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(|e| docx_err(&e))?;

    Ok(docx_paragraphs(&xml))
}

/// Text runs of a WordprocessingML body, one line per paragraph.
///
/// Comments are skipped, CDATA inside a text run is kept verbatim, and
/// `w:tab` only counts inside runs (not in paragraph tab-stop lists).
fn docx_paragraphs(xml: &str) -> String {
    let mut out = String::new();
    let mut in_text = false;
    let mut in_tab_stops = false;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_text {
            out.push_str(&unescape_xml(&rest[..open]));
        }
        let markup = &rest[open..];

        if let Some(body) = markup.strip_prefix("<!--") {
            let Some(end) = body.find("-->") else {
                break;
            };
            rest = &body[end + 3..];
            continue;
        }
        if let Some(body) = markup.strip_prefix("<![CDATA[") {
            let Some(end) = body.find("]]>") else {
                break;
            };
            if in_text {
                out.push_str(&body[..end]);
            }
            rest = &body[end + 3..];
            continue;
        }

        let Some(len) = markup.find('>') else {
            break;
        };
        let tag = &markup[1..len];
        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_end_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or_default();

        match name {
            "w:t" => in_text = !self_closing,
            "/w:t" => in_text = false,
            "/w:p" => out.push('\n'),
            "w:tabs" => in_tab_stops = !self_closing,
            "/w:tabs" => in_tab_stops = false,
            "w:tab" if !in_tab_stops => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            _ => {}
        }

        rest = &markup[len + 1..];
    }

    out
}

fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let Some(semi) = after.find(';') else {
            out.push_str(after);
            return out;
        };
        let entity = &after[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                .and_then(|code| code.ok())
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&after[..=semi]),
        }
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    out
}

// endregion: --- Text Extraction

#[derive(Clone)]
pub struct FileService {
    db: DbPool,
}

impl FileService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Validate, extract and attach an upload to a chat.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, chat_id: i64, original_filename: &str, bytes: Vec<u8>) -> Result<FileResponse> {
        validate_upload(original_filename, bytes.len())?;

        if ChatRepository::find_by_id(&self.db, chat_id).await?.is_none() {
            return Err(AppError::chat_not_found());
        }

        let kind = file_type(original_filename);
        let file_size = i64::try_from(bytes.len())
            .map_err(|_| AppError::InvalidInput("File too large".to_string()))?;
        let content = extract_text(original_filename, bytes).await?;
        if content.is_empty() {
            warn!(chat_id, filename = %original_filename, "Upload produced no text");
        }

        let data = FileForCreate {
            chat_id,
            filename: format!("{}.{}", Uuid::new_v4(), kind),
            original_filename: original_filename.to_string(),
            file_type: kind,
            file_size,
            content,
        };
        let file = FileRepository::create(&self.db, &data, Utc::now()).await?;

        info!(
            chat_id,
            file_id = file.id,
            file_type = %file.file_type,
            chars = file.content.chars().count(),
            "Stored file attachment"
        );
        Ok(file.into())
    }

    pub async fn list(&self, chat_id: i64) -> Result<Vec<FileResponse>> {
        if ChatRepository::find_by_id(&self.db, chat_id).await?.is_none() {
            return Err(AppError::chat_not_found());
        }
        let files = FileRepository::list_for_chat(&self.db, chat_id).await?;
        Ok(files.into_iter().map(FileResponse::from).collect())
    }

    pub async fn delete(&self, chat_id: i64, file_id: i64) -> Result<()> {
        let removed = FileRepository::delete(&self.db, chat_id, file_id).await?;
        if removed == 0 {
            return Err(AppError::file_not_found());
        }
        info!(chat_id, file_id, "Deleted file attachment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::create_memory_pool;
    use lib_core::model::store::ChatForCreate;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_file_type() {
        assert_eq!(file_type("Report.PDF"), "pdf");
        assert_eq!(file_type("notes.tar.md"), "md");
        assert_eq!(file_type("README"), "unknown");
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload("a.txt", 10).is_ok());
        assert!(validate_upload("a.docx", MAX_FILE_SIZE).is_ok());

        let err = validate_upload("a.rtf", 10).unwrap_err();
        assert_eq!(
            err.user_message(),
            "File type not allowed. Allowed types: .pdf, .docx, .txt, .md"
        );
        assert!(validate_upload("legacy.doc", 10).is_err());
        assert_eq!(
            validate_upload("a.txt", MAX_FILE_SIZE + 1).unwrap_err().user_message(),
            "File too large. Maximum size: 10MB"
        );
        assert!(validate_upload("  ", 1).is_err());
    }

    #[tokio::test]
    async fn test_text_decoding_falls_back_to_latin1() {
        let text = extract_text("a.txt", "  hello\n".as_bytes().to_vec()).await.unwrap();
        assert_eq!(text, "hello");

        // 0xE9 alone is invalid UTF-8 and 'é' in Latin-1.
        let text = extract_text("b.md", vec![b'c', b'a', b'f', 0xE9]).await.unwrap();
        assert_eq!(text, "café");
    }

    #[tokio::test]
    async fn test_docx_paragraphs() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
<w:p><w:r><w:t>Fish &amp; chips&#33;</w:t></w:r></w:p>
<w:p><w:pPr/></w:p>
</w:body></w:document>"#;

        let text = extract_text("doc.docx", docx_with_body(body)).await.unwrap();
        assert_eq!(text, "Hello world\nFish & chips!");
    }

    #[test]
    fn test_docx_runs_comments_and_cdata() {
        let xml = concat!(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>"#,
            r#"<w:r><w:t>Name</w:t><w:tab/><w:t>Value</w:t><w:br w:type="line"/><w:t>Next</w:t></w:r></w:p>"#,
            r#"<!-- <w:p><w:r><w:t>hidden > text</w:t></w:r></w:p> -->"#,
            r#"<w:p><w:r><w:t><![CDATA[a < b & c]]></w:t></w:r></w:p>"#,
        );
        assert_eq!(docx_paragraphs(xml), "Name\tValue\nNext\na < b & c\n");
    }

    #[tokio::test]
    async fn test_broken_docx_is_rejected() {
        let err = extract_text("doc.docx", b"not a zip".to_vec()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_unescape_keeps_unknown_entities() {
        assert_eq!(unescape_xml("a &lt;b&gt; &nbsp; c"), "a <b> &nbsp; c");
        assert_eq!(unescape_xml("&#x41;&#66;"), "AB");
    }

    #[tokio::test]
    async fn test_upload_list_delete() {
        let db = create_memory_pool().await.unwrap();
        let chat = ChatRepository::create(&db, &ChatForCreate::default(), Utc::now())
            .await
            .unwrap();
        let service = FileService::new(db);

        let stored = service
            .upload(chat.id, "notes.TXT", b"remember the milk".to_vec())
            .await
            .unwrap();
        assert_eq!(stored.file_type, "txt");
        assert_eq!(stored.original_filename, "notes.TXT");
        assert_eq!(stored.file_size, 17);
        assert!(stored.filename.ends_with(".txt"));
        assert_ne!(stored.filename, "notes.TXT");

        let files = service.list(chat.id).await.unwrap();
        assert_eq!(files, vec![stored.clone()]);

        service.delete(chat.id, stored.id).await.unwrap();
        assert!(service.list(chat.id).await.unwrap().is_empty());
        assert!(matches!(
            service.delete(chat.id, stored.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_upload_to_missing_chat() {
        let service = FileService::new(create_memory_pool().await.unwrap());
        let err = service.upload(999, "a.txt", b"x".to_vec()).await.unwrap_err();
        assert_eq!(err.user_message(), "Chat not found");
    }
}
