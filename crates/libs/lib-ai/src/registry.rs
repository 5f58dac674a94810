//! # Provider Registry
//!
//! Process-wide set of provider clients, built once at startup and shared
//! through application state.

use crate::client::ChatProvider;
use crate::error::ProviderError;
use crate::openai_compat::{OpenAiCompatProvider, ProviderEndpoint};
use crate::provider::ProviderKind;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Inputs needed to construct the default providers.
#[derive(Clone)]
pub struct ProviderSettings {
    pub openai_api_key: Option<String>,
    pub xai_api_key: Option<String>,
    pub openai_base_url: String,
    pub xai_base_url: String,
    pub request_timeout: Duration,
    pub stream_pacing: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            xai_api_key: None,
            openai_base_url: ProviderKind::OpenAi.default_base_url().to_string(),
            xai_base_url: ProviderKind::Xai.default_base_url().to_string(),
            request_timeout: Duration::from_secs(60),
            stream_pacing: Duration::ZERO,
        }
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("xai_api_key", &self.xai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("xai_base_url", &self.xai_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("stream_pacing", &self.stream_pacing)
            .finish()
    }
}

/// Lookup from provider identifier to client.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    /// Empty registry; every lookup reports the provider as unconfigured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the client for its provider kind.
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Build both default providers over one shared HTTP client.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::transport(ProviderKind::OpenAi, e))?;

        let endpoints = [
            ProviderEndpoint::new(
                ProviderKind::OpenAi,
                settings.openai_base_url.clone(),
                settings.openai_api_key.clone(),
            ),
            ProviderEndpoint::new(
                ProviderKind::Xai,
                settings.xai_base_url.clone(),
                settings.xai_api_key.clone(),
            ),
        ];

        let mut registry = Self::new();
        for endpoint in endpoints {
            let provider = OpenAiCompatProvider::new(http.clone(), endpoint, settings.request_timeout)
                .with_pacing(settings.stream_pacing);
            if provider.is_configured() {
                info!(provider = provider.kind().id(), base_url = %provider.endpoint().base_url, "Provider configured");
            } else {
                warn!(
                    provider = provider.kind().id(),
                    env = provider.kind().api_key_env(),
                    "Provider API key missing; requests to it will be rejected"
                );
            }
            registry = registry.with_provider(Arc::new(provider));
        }
        Ok(registry)
    }

    /// Resolve a caller-supplied identifier (case-insensitive).
    ///
    /// Unknown identifiers fail with `UnsupportedProvider`; known but
    /// unregistered ones with `Unconfigured`. No network activity happens.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn ChatProvider>, ProviderError> {
        let kind: ProviderKind = id.parse()?;
        self.get(kind)
    }

    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn ChatProvider>, ProviderError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or(ProviderError::Unconfigured { provider: kind })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.providers.keys().map(|k| k.id()).collect();
        kinds.sort_unstable();
        f.debug_struct("ProviderRegistry").field("providers", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown() {
        let registry = ProviderRegistry::from_settings(&ProviderSettings {
            xai_api_key: Some("xai-test".into()),
            ..Default::default()
        })
        .unwrap();

        let xai = registry.resolve("XAI").unwrap();
        assert_eq!(xai.kind(), ProviderKind::Xai);
        assert!(xai.is_configured());

        let openai = registry.resolve("openai").unwrap();
        assert!(!openai.is_configured());

        assert!(matches!(
            registry.resolve("anthropic"),
            Err(ProviderError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn test_empty_registry_reports_unconfigured() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.resolve("openai"),
            Err(ProviderError::Unconfigured { provider: ProviderKind::OpenAi })
        ));
    }

    #[test]
    fn test_settings_debug_redacts_keys() {
        let settings = ProviderSettings {
            openai_api_key: Some("sk-live".into()),
            ..Default::default()
        };
        assert!(!format!("{:?}", settings).contains("sk-live"));
    }
}
