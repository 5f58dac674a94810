//! # Provider Errors
//!
//! Classified failures of a Provider Client call.
//!
//! Messages name the provider and never include credentials. Raw remote
//! bodies are kept as short excerpts for server logs only; [`ProviderError::user_message`]
//! is what callers show to end users.

use crate::provider::ProviderKind;
use lib_utils::excerpt;
use thiserror::Error;

/// Longest remote body excerpt kept in an error.
const BODY_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Credential missing or left at its placeholder value.
    #[error("{provider} API key not configured or invalid")]
    Unconfigured { provider: ProviderKind },

    /// Provider identifier outside the supported set.
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Credential rejected by the remote service.
    #[error("{provider} API authentication failed (HTTP {status})")]
    AuthenticationFailed { provider: ProviderKind, status: u16 },

    /// Remote service throttled the request.
    #[error("{provider} API rate limit exceeded")]
    RateLimited { provider: ProviderKind },

    /// Non-2xx status or a payload that could not be understood.
    #[error("{provider} API error{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    RemoteError {
        provider: ProviderKind,
        status: Option<u16>,
        message: String,
    },

    /// Network-level failure (connect, timeout, broken stream).
    #[error("{provider} API request failed: {message}")]
    TransportError { provider: ProviderKind, message: String },
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    pub fn from_status(provider: ProviderKind, status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ProviderError::AuthenticationFailed { provider, status },
            429 => ProviderError::RateLimited { provider },
            _ => ProviderError::RemoteError {
                provider,
                status: Some(status),
                message: excerpt(body, BODY_EXCERPT_CHARS),
            },
        }
    }

    /// Payload that parsed as HTTP success but not as the expected shape.
    pub fn malformed(provider: ProviderKind, detail: impl std::fmt::Display) -> Self {
        ProviderError::RemoteError {
            provider,
            status: None,
            message: format!("malformed response: {}", detail),
        }
    }

    /// Wrap a transport failure from the HTTP client.
    pub fn transport(provider: ProviderKind, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not connect".to_string()
        } else {
            // Drop the URL so query strings never reach logs.
            err.without_url().to_string()
        };
        ProviderError::TransportError { provider, message }
    }

    /// Actionable, secret-free message for end users.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Unconfigured { provider } => format!(
                "{} API key not configured. Please check your environment variables.",
                provider.id().to_uppercase()
            ),
            ProviderError::UnsupportedProvider(id) => format!("Unsupported provider: {}", id),
            ProviderError::AuthenticationFailed { provider, .. } => format!(
                "{} API authentication failed. Please check your API key.",
                provider
            ),
            ProviderError::RateLimited { provider } => format!(
                "{} API rate limit exceeded. Please try again later.",
                provider
            ),
            ProviderError::RemoteError { provider, .. } => {
                format!("{} API error. Please try again later.", provider)
            }
            ProviderError::TransportError { provider, .. } => format!(
                "{} API request failed. Please check your network connection.",
                provider
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let p = ProviderKind::Xai;
        assert!(matches!(
            ProviderError::from_status(p, 401, ""),
            ProviderError::AuthenticationFailed { status: 401, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(p, 429, "slow down"),
            ProviderError::RateLimited { .. }
        ));
        assert!(matches!(
            ProviderError::from_status(p, 500, "boom"),
            ProviderError::RemoteError { status: Some(500), .. }
        ));
    }

    #[test]
    fn test_remote_body_is_truncated() {
        let body = "x".repeat(1000);
        match ProviderError::from_status(ProviderKind::OpenAi, 500, &body) {
            ProviderError::RemoteError { message, .. } => {
                assert_eq!(message.chars().count(), BODY_EXCERPT_CHARS + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_user_messages_name_the_provider() {
        let err = ProviderError::Unconfigured { provider: ProviderKind::OpenAi };
        assert_eq!(
            err.user_message(),
            "OPENAI API key not configured. Please check your environment variables."
        );

        let err = ProviderError::AuthenticationFailed { provider: ProviderKind::Xai, status: 401 };
        assert!(err.user_message().starts_with("xAI API authentication failed"));

        let err = ProviderError::TransportError {
            provider: ProviderKind::Xai,
            message: "could not connect".into(),
        };
        assert_eq!(
            err.user_message(),
            "xAI API request failed. Please check your network connection."
        );
    }
}
