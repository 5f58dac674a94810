//! # Request Types
//!
//! Conversation turns, mode flags, and the generation parameters they imply.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One `{role, content}` pair of the outbound conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Per-request mode toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    /// Favor deterministic, step-by-step output.
    pub thinking: bool,
    /// Allow a longer, more thorough answer.
    pub deep_research: bool,
}

impl ModeFlags {
    pub fn new(thinking: bool, deep_research: bool) -> Self {
        Self { thinking, deep_research }
    }
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub const BASE_MAX_TOKENS: u32 = 1000;
    pub const DEEP_RESEARCH_MAX_TOKENS: u32 = 2000;
    pub const BASE_TEMPERATURE: f32 = 0.7;
    pub const THINKING_TEMPERATURE: f32 = 0.3;

    /// Parameters implied by the mode flags. Modes change limits and
    /// sampling only, never the request semantics.
    pub fn for_modes(modes: ModeFlags) -> Self {
        Self {
            max_tokens: if modes.deep_research {
                Self::DEEP_RESEARCH_MAX_TOKENS
            } else {
                Self::BASE_MAX_TOKENS
            },
            temperature: if modes.thinking {
                Self::THINKING_TEMPERATURE
            } else {
                Self::BASE_TEMPERATURE
            },
        }
    }
}

/// Model entry returned by model listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}
