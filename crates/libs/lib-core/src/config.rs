//! # Application Configuration
//!
//! Configuration loaded from environment variables (after `.env` is read by
//! the binary). Values are validated once at startup so a bad deployment
//! fails fast instead of on the first request.
//!
//! The resulting [`Config`] is passed explicitly through application state:
//!
//! ```rust,no_run
//! use lib_core::config::Config;
//!
//! let config = Config::from_env()?;
//! config.validate()?;
//! let settings = config.provider_settings();
//! # Ok::<(), String>(())
//! ```

use lib_ai::{ProviderKind, ProviderSettings};
use lib_utils::{get_env_bool, get_env_or, get_env_parse_or, validate_range};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What happens to the user message when a streamed exchange fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamFailurePolicy {
    /// Keep the user message; the chat shows an unanswered question.
    #[default]
    Retain,
    /// Delete the user message, matching the non-streaming exchange.
    Compensate,
}

impl StreamFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamFailurePolicy::Retain => "retain",
            StreamFailurePolicy::Compensate => "compensate",
        }
    }
}

impl fmt::Display for StreamFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" => Ok(StreamFailurePolicy::Retain),
            "compensate" => Ok(StreamFailurePolicy::Compensate),
            other => Err(format!(
                "STREAM_FAILURE_POLICY must be 'retain' or 'compensate', got '{}'",
                other
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// OpenAI credential; placeholder values count as unset
    pub openai_api_key: Option<String>,

    /// xAI credential; placeholder values count as unset
    pub xai_api_key: Option<String>,

    pub openai_base_url: String,
    pub xai_base_url: String,

    /// Timeout for non-streaming provider requests.
    ///
    /// Valid range: 1-600 seconds
    pub provider_timeout_secs: u64,

    /// Delay inserted before each streamed fragment (0 disables pacing).
    ///
    /// Valid range: 0-1000 milliseconds
    pub stream_pacing_ms: u64,

    /// Prepend mode instructions to the outbound prompt
    pub mode_prompt_prefix: bool,

    /// Create a chat when a message targets an unknown chat id
    pub auto_create_chats: bool,

    pub stream_failure_policy: StreamFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/chat_history.db".to_string(),
            openai_api_key: None,
            xai_api_key: None,
            openai_base_url: ProviderKind::OpenAi.default_base_url().to_string(),
            xai_base_url: ProviderKind::Xai.default_base_url().to_string(),
            provider_timeout_secs: 60,
            stream_pacing_ms: 0,
            mode_prompt_prefix: true,
            auto_create_chats: true,
            stream_failure_policy: StreamFailurePolicy::Retain,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let database_url = get_env_or("DATABASE_URL", &defaults.database_url);
        let openai_api_key = optional_env(ProviderKind::OpenAi.api_key_env());
        let xai_api_key = optional_env(ProviderKind::Xai.api_key_env());
        let openai_base_url = get_env_or("OPENAI_BASE_URL", &defaults.openai_base_url);
        let xai_base_url = get_env_or("XAI_BASE_URL", &defaults.xai_base_url);

        let provider_timeout_secs =
            get_env_parse_or("PROVIDER_TIMEOUT_SECS", defaults.provider_timeout_secs)
                .map_err(|e| e.to_string())?;
        let stream_pacing_ms = get_env_parse_or("STREAM_PACING_MS", defaults.stream_pacing_ms)
            .map_err(|e| e.to_string())?;
        let mode_prompt_prefix = get_env_bool("MODE_PROMPT_PREFIX", defaults.mode_prompt_prefix)
            .map_err(|e| e.to_string())?;
        let auto_create_chats = get_env_bool("AUTO_CREATE_CHATS", defaults.auto_create_chats)
            .map_err(|e| e.to_string())?;
        let stream_failure_policy = get_env_or("STREAM_FAILURE_POLICY", "retain").parse()?;

        Ok(Self {
            database_url,
            openai_api_key,
            xai_api_key,
            openai_base_url,
            xai_base_url,
            provider_timeout_secs,
            stream_pacing_ms,
            mode_prompt_prefix,
            auto_create_chats,
            stream_failure_policy,
        })
    }

    /// Validate configuration values against operational limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err("DATABASE_URL cannot be empty".to_string());
        }

        validate_range(self.provider_timeout_secs, 1, 600, "PROVIDER_TIMEOUT_SECS")?;
        validate_range(self.stream_pacing_ms, 0, 1000, "STREAM_PACING_MS")?;

        for (name, url) in [
            ("OPENAI_BASE_URL", &self.openai_base_url),
            ("XAI_BASE_URL", &self.xai_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("{} must be an http(s) URL", name));
            }
        }

        Ok(())
    }

    /// Settings for building the provider registry.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            openai_api_key: self.openai_api_key.clone(),
            xai_api_key: self.xai_api_key.clone(),
            openai_base_url: self.openai_base_url.clone(),
            xai_base_url: self.xai_base_url.clone(),
            request_timeout: Duration::from_secs(self.provider_timeout_secs),
            stream_pacing: Duration::from_millis(self.stream_pacing_ms),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("xai_api_key", &self.xai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("xai_base_url", &self.xai_base_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("stream_pacing_ms", &self.stream_pacing_ms)
            .field("mode_prompt_prefix", &self.mode_prompt_prefix)
            .field("auto_create_chats", &self.auto_create_chats)
            .field("stream_failure_policy", &self.stream_failure_policy)
            .finish()
    }
}

fn optional_env(name: &'static str) -> Option<String> {
    lib_utils::get_env(name).ok().filter(|v| !v.trim().is_empty())
}
