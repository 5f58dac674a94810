//! # OpenAI-Compatible Provider
//!
//! One HTTP client implementation shared by every provider that speaks the
//! `/chat/completions` protocol. Per-provider differences (base URL,
//! credential, model catalog) live in [`ProviderEndpoint`].

use crate::client::{ChatProvider, FragmentStream};
use crate::error::ProviderError;
use crate::provider::ProviderKind;
use crate::sse::{SseDecoder, SseFrame};
use crate::types::{ChatTurn, GenerationParams, ModeFlags, ModelInfo};
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info, warn};

// region: --- Endpoint

/// Where a provider's model list comes from.
#[derive(Debug, Clone)]
pub enum ModelCatalog {
    /// Fixed list served without network access.
    Static(Vec<ModelInfo>),
    /// Fetched from `GET {base}/models`.
    Remote,
}

impl ModelCatalog {
    /// Default catalog for a provider.
    pub fn default_for(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenAi => ModelCatalog::Static(
                [
                    ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
                    ("gpt-4", "GPT-4"),
                    ("gpt-4-turbo", "GPT-4 Turbo"),
                ]
                .into_iter()
                .map(|(id, name)| ModelInfo {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            ),
            ProviderKind::Xai => ModelCatalog::Remote,
        }
    }
}

/// Connection details for one provider.
#[derive(Clone)]
pub struct ProviderEndpoint {
    pub kind: ProviderKind,
    pub base_url: String,
    pub model_catalog: ModelCatalog,
    api_key: Option<String>,
}

impl ProviderEndpoint {
    /// Build an endpoint. Placeholder or blank keys are dropped so the
    /// provider reports itself as unconfigured.
    pub fn new(kind: ProviderKind, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| kind.is_usable_key(k));
        Self {
            kind,
            base_url,
            model_catalog: ModelCatalog::default_for(kind),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured { provider: self.kind })
    }
}

impl fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// endregion: --- Endpoint

// region: --- Wire Types

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<RemoteModel>,
}

#[derive(Debug, Deserialize)]
struct RemoteModel {
    id: String,
}

// endregion: --- Wire Types

// region: --- Provider

/// Chat provider over the OpenAI-compatible HTTP protocol.
#[derive(Debug, Clone)]
pub struct OpenAiCompatProvider {
    http: reqwest::Client,
    endpoint: ProviderEndpoint,
    timeout: Duration,
    pacing: Duration,
}

impl OpenAiCompatProvider {
    pub fn new(http: reqwest::Client, endpoint: ProviderEndpoint, timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            timeout,
            pacing: Duration::ZERO,
        }
    }

    /// Insert a fixed delay before each streamed fragment.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn endpoint(&self) -> &ProviderEndpoint {
        &self.endpoint
    }

    /// POST the completion request and return the response once its status
    /// is known to be successful.
    async fn post_completion(
        &self,
        turns: &[ChatTurn],
        model: &str,
        modes: ModeFlags,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let kind = self.endpoint.kind;
        let api_key = self.endpoint.api_key()?;
        let params = GenerationParams::for_modes(modes);
        let body = CompletionRequest {
            model,
            messages: turns,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream,
        };
        let url = format!("{}/chat/completions", self.endpoint.base_url);

        info!(
            provider = kind.id(),
            model,
            turns = turns.len(),
            max_tokens = params.max_tokens,
            stream,
            "Sending chat completion request"
        );

        let mut request = self.http.post(&url).bearer_auth(api_key).json(&body);
        if !stream {
            // Streams may legitimately outlive the timeout; they are bounded
            // by the client's connect timeout and the consumer instead.
            request = request.timeout(self.timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::transport(kind, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ProviderError::from_status(kind, status.as_u16(), &body);
            warn!(provider = kind.id(), status = status.as_u16(), error = %err, "Chat completion rejected");
            return Err(err);
        }

        debug!(provider = kind.id(), status = status.as_u16(), "Chat completion accepted");
        Ok(response)
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn kind(&self) -> ProviderKind {
        self.endpoint.kind
    }

    fn is_configured(&self) -> bool {
        self.endpoint.api_key.is_some()
    }

    async fn complete(
        &self,
        turns: &[ChatTurn],
        model: &str,
        modes: ModeFlags,
    ) -> Result<String, ProviderError> {
        let kind = self.endpoint.kind;
        let response = self.post_completion(turns, model, modes, false).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(kind, e))?;

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::malformed(kind, e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::malformed(kind, "no choices[0].message.content"))
    }

    async fn stream(
        &self,
        turns: &[ChatTurn],
        model: &str,
        modes: ModeFlags,
    ) -> Result<FragmentStream, ProviderError> {
        let kind = self.endpoint.kind;
        let response = self.post_completion(turns, model, modes, true).await?;
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| ProviderError::transport(kind, e)));

        let fragments = decode_fragments(kind, body);
        if self.pacing.is_zero() {
            return Ok(fragments);
        }

        let pacing = self.pacing;
        Ok(fragments
            .then(move |item| async move {
                tokio::time::sleep(pacing).await;
                item
            })
            .boxed())
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let kind = self.endpoint.kind;
        match &self.endpoint.model_catalog {
            ModelCatalog::Static(models) => Ok(models.clone()),
            ModelCatalog::Remote => {
                let api_key = self.endpoint.api_key()?;
                let url = format!("{}/models", self.endpoint.base_url);

                let response = self
                    .http
                    .get(&url)
                    .bearer_auth(api_key)
                    .timeout(self.timeout)
                    .send()
                    .await
                    .map_err(|e| ProviderError::transport(kind, e))?;

                let status = response.status();
                let text = response
                    .text()
                    .await
                    .map_err(|e| ProviderError::transport(kind, e))?;
                if !status.is_success() {
                    return Err(ProviderError::from_status(kind, status.as_u16(), &text));
                }

                let parsed: ModelsResponse =
                    serde_json::from_str(&text).map_err(|e| ProviderError::malformed(kind, e))?;
                Ok(parsed
                    .data
                    .into_iter()
                    .map(|m| ModelInfo {
                        name: m.id.clone(),
                        id: m.id,
                    })
                    .collect())
            }
        }
    }
}

// endregion: --- Provider

// region: --- Stream Decoding

struct DecodeState<S> {
    kind: ProviderKind,
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, ProviderError>>,
    finished: bool,
}

impl<S> DecodeState<S> {
    fn accept(&mut self, frame: SseFrame) {
        if self.finished {
            return;
        }
        match frame {
            SseFrame::Done => self.finished = true,
            SseFrame::Data(data) => {
                if data.trim().is_empty() {
                    return;
                }
                match serde_json::from_str::<StreamChunk>(&data) {
                    Ok(chunk) => {
                        if let Some(error) = chunk.error {
                            self.fail(ProviderError::RemoteError {
                                provider: self.kind,
                                status: None,
                                message: lib_utils::excerpt(&error.to_string(), 300),
                            });
                            return;
                        }
                        let text = chunk
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.delta.content)
                            .unwrap_or_default();
                        if !text.is_empty() {
                            self.pending.push_back(Ok(text));
                        }
                    }
                    Err(e) => self.fail(ProviderError::malformed(self.kind, e)),
                }
            }
        }
    }

    fn fail(&mut self, err: ProviderError) {
        self.pending.push_back(Err(err));
        self.finished = true;
    }
}

/// Turn an SSE response body into text fragments.
///
/// The stream ends at `[DONE]` or end of body. A transport or payload error
/// is yielded once and ends the stream.
pub(crate) fn decode_fragments<S, B>(kind: ProviderKind, body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, ProviderError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = DecodeState {
        kind,
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                if item.is_err() {
                    st.pending.clear();
                }
                return Some((item, st));
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(chunk)) => {
                    for frame in st.decoder.push(chunk.as_ref()) {
                        st.accept(frame);
                    }
                }
                Some(Err(err)) => st.fail(err),
                None => {
                    if let Some(frame) = st.decoder.finish() {
                        st.accept(frame);
                    }
                    st.finished = true;
                }
            }
        }
    })
    .boxed()
}

// endregion: --- Stream Decoding

#[cfg(test)]
mod tests {
    use super::*;

    fn body(chunks: &[&str]) -> impl Stream<Item = Result<Vec<u8>, ProviderError>> + Send + 'static {
        let items: Vec<Result<Vec<u8>, ProviderError>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        stream::iter(items)
    }

    fn delta(text: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": text}}]})
        )
    }

    #[tokio::test]
    async fn test_fragments_in_order_until_done() {
        let first = delta("He");
        let second = delta("llo");
        let ignored = delta("ignored");
        let (a, b) = second.split_at(10);
        let chunks = [first.as_str(), a, b, "data: [DONE]\n\n", ignored.as_str()];

        let out: Vec<_> = decode_fragments(ProviderKind::OpenAi, body(&chunks))
            .collect()
            .await;
        let texts: Vec<String> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["He".to_string(), "llo".to_string()]);
    }

    #[tokio::test]
    async fn test_role_only_deltas_are_skipped() {
        let role = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n";
        let hi = delta("Hi");
        let chunks = [role, hi.as_str(), "data: [DONE]\n\n"];
        let out: Vec<_> = decode_fragments(ProviderKind::Xai, body(&chunks))
            .collect()
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_deref().unwrap(), "Hi");
    }

    #[tokio::test]
    async fn test_error_payload_ends_stream() {
        let partial = delta("par");
        let never = delta("never");
        let chunks = [
            partial.as_str(),
            "data: {\"error\":{\"message\":\"overloaded\"}}\n\n",
            never.as_str(),
        ];

        let out: Vec<_> = decode_fragments(ProviderKind::Xai, body(&chunks))
            .collect()
            .await;
        assert_eq!(out.len(), 2);
        assert!(out[0].is_ok());
        assert!(matches!(out[1], Err(ProviderError::RemoteError { .. })));
    }

    #[tokio::test]
    async fn test_transport_error_is_terminal() {
        let items: Vec<Result<Vec<u8>, ProviderError>> = vec![
            Ok(delta("a").into_bytes()),
            Err(ProviderError::TransportError {
                provider: ProviderKind::OpenAi,
                message: "reset".into(),
            }),
            Ok(delta("b").into_bytes()),
        ];
        let out: Vec<_> = decode_fragments(ProviderKind::OpenAi, stream::iter(items))
            .collect()
            .await;
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], Err(ProviderError::TransportError { .. })));
    }

    #[tokio::test]
    async fn test_unconfigured_fails_before_network() {
        let endpoint = ProviderEndpoint::new(
            ProviderKind::Xai,
            "http://127.0.0.1:9",
            Some("your_xai_api_key_here".into()),
        );
        let provider =
            OpenAiCompatProvider::new(reqwest::Client::new(), endpoint, Duration::from_secs(1));
        assert!(!provider.is_configured());

        let err = provider
            .complete(&[ChatTurn::user("hi")], "grok-3", ModeFlags::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured { provider: ProviderKind::Xai }));

        let err = provider.list_models().await.unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured { .. }));
    }

    #[tokio::test]
    async fn test_openai_catalog_is_static() {
        let endpoint = ProviderEndpoint::new(ProviderKind::OpenAi, "http://127.0.0.1:9/", None);
        assert_eq!(endpoint.base_url, "http://127.0.0.1:9");
        let provider =
            OpenAiCompatProvider::new(reqwest::Client::new(), endpoint, Duration::from_secs(1));
        let ids: Vec<String> = provider
            .list_models()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo"]);
    }

    #[test]
    fn test_debug_redacts_key() {
        let endpoint = ProviderEndpoint::new(ProviderKind::OpenAi, "https://x", Some("sk-secret".into()));
        let rendered = format!("{:?}", endpoint);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
