//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across all backend modules. It follows the `thiserror` pattern for ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx) - User/input issues
//!    - [`InvalidInput`](AppError::InvalidInput) → 400 Bad Request
//!    - [`NotFound`](AppError::NotFound) → 404 Not Found
//!
//! 2. **Provider Errors** - Failures of the external chat-completion service,
//!    mapped per [`ProviderError`] variant:
//!    - `Unconfigured`, `UnsupportedProvider`, `AuthenticationFailed` → 400
//!    - `RateLimited` → 429
//!    - `RemoteError`, `TransportError` → 502 Bad Gateway
//!
//! 3. **Server Errors** (5xx) - Internal/system issues
//!    - [`Config`](AppError::Config) → 500 Internal Server Error
//!    - [`Persistence`](AppError::Persistence) → 500 Internal Server Error
//!    - [`Internal`](AppError::Internal) → 500 Internal Server Error
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn require_content(content: &str) -> Result<&str> {
//!     if content.trim().is_empty() {
//!         return Err(AppError::InvalidInput("content cannot be empty".to_string()));
//!     }
//!     Ok(content)
//! }
//! ```
//!
//! ## Error Conversion
//!
//! - `From<ProviderError>` - Provider failures keep their classification
//! - `From<anyhow::Error>` - Convert anyhow errors to AppError
//! - `From<sqlx::Error>` - Convert database errors to AppError
//! - `From<serde_json::Error>` - Convert JSON errors to AppError

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use lib_ai::ProviderError;
use serde_json::json;
use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input validation error.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested resource not found.
    ///
    /// **HTTP Status**: 404 Not Found
    #[error("Not found: {0}")]
    NotFound(String),

    /// External chat-completion provider failure.
    ///
    /// **HTTP Status**: 400, 429 or 502 depending on the classification
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Database read or write failure.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal server error (unexpected failures).
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn chat_not_found() -> Self {
        AppError::NotFound("Chat not found".to_string())
    }

    pub fn file_not_found() -> Self {
        AppError::NotFound("File not found".to_string())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Provider(err) => match err {
                ProviderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                ProviderError::RemoteError { .. } | ProviderError::TransportError { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                ProviderError::Unconfigured { .. }
                | ProviderError::UnsupportedProvider(_)
                | ProviderError::AuthenticationFailed { .. } => StatusCode::BAD_REQUEST,
            },
            AppError::Config(_) | AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Provider(err) => err.user_message(),
            AppError::Config(_) | AppError::Persistence(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    /// Stable machine-readable code for the `code` field of error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Config",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Provider(err) => match err {
                ProviderError::Unconfigured { .. } => "Unconfigured",
                ProviderError::UnsupportedProvider(_) => "UnsupportedProvider",
                ProviderError::AuthenticationFailed { .. } => "AuthenticationFailed",
                ProviderError::RateLimited { .. } => "RateLimited",
                ProviderError::RemoteError { .. } => "RemoteError",
                ProviderError::TransportError { .. } => "TransportError",
            },
            AppError::Persistence(_) => "InternalPersistenceError",
            AppError::Internal(_) => "Internal",
        }
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        // Full error for server logs; the body only carries the user message.
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Server error: {}", self);
        } else {
            tracing::debug!(code = self.code(), "Client error: {}", self);
        }

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert `sqlx::Error` to `AppError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::Persistence(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Persistence(format!("Database error: {}", err)),
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}
