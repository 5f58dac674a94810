//! # Provider Identifiers
//!
//! The closed set of supported providers and their per-provider constants.

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported chat-completion providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions
    #[default]
    OpenAi,
    /// xAI (Grok) chat completions
    Xai,
}

impl ProviderKind {
    /// Identifier used on the wire and in the database (`openai`, `xai`).
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Xai => "xai",
        }
    }

    /// Human-readable provider name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Xai => "xAI",
        }
    }

    /// Default API base URL (without trailing slash).
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Xai => "https://api.x.ai/v1",
        }
    }

    /// Model used when neither the request nor the chat names one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-3.5-turbo",
            ProviderKind::Xai => "grok-3",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Xai => "XAI_API_KEY",
        }
    }

    /// Placeholder value shipped in sample `.env` files; treated as unset.
    pub fn placeholder_key(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "your_openai_api_key_here",
            ProviderKind::Xai => "your_xai_api_key_here",
        }
    }

    /// Whether `key` is a usable credential for this provider.
    pub fn is_usable_key(&self, key: &str) -> bool {
        let key = key.trim();
        !key.is_empty() && key != self.placeholder_key()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "xai" => Ok(ProviderKind::Xai),
            _ => Err(ProviderError::UnsupportedProvider(s.to_string())),
        }
    }
}
