//! # Provider Client Contract
//!
//! The polymorphic seam between orchestration and concrete providers.

use crate::error::ProviderError;
use crate::provider::ProviderKind;
use crate::types::{ChatTurn, ModeFlags, ModelInfo};
use futures_util::stream::BoxStream;

/// Incremental text fragments of a streamed completion.
///
/// Finite and not restartable. The consumer concatenates fragments; an `Err`
/// item is terminal.
pub type FragmentStream = BoxStream<'static, Result<String, ProviderError>>;

/// A chat-completion provider.
///
/// Implementations must fail with [`ProviderError::Unconfigured`] before any
/// network activity when they hold no usable credential.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Which provider this client talks to.
    fn kind(&self) -> ProviderKind;

    /// Whether a usable credential is present.
    fn is_configured(&self) -> bool;

    /// Request a full completion for `turns`.
    async fn complete(
        &self,
        turns: &[ChatTurn],
        model: &str,
        modes: ModeFlags,
    ) -> Result<String, ProviderError>;

    /// Request a streamed completion for `turns`.
    ///
    /// Errors that occur before the first byte (credential, status) are
    /// returned here; later failures arrive as the stream's last item.
    async fn stream(
        &self,
        turns: &[ChatTurn],
        model: &str,
        modes: ModeFlags,
    ) -> Result<FragmentStream, ProviderError>;

    /// Models offered by this provider.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError>;
}
