//! # AI Provider Library
//!
//! Provider Client for external chat-completion services.
//!
//! Both supported providers speak the OpenAI-compatible chat-completions
//! protocol, so a single [`OpenAiCompatProvider`] is parameterized per provider
//! with a [`ProviderEndpoint`] (base URL, credential, model catalog). Callers
//! depend on the [`ChatProvider`] trait and obtain instances from a
//! [`ProviderRegistry`] built once at startup.
//!
//! ```text
//! ProviderRegistry::resolve("xai") → Arc<dyn ChatProvider>
//!     ├─ complete(turns, model, modes) → String
//!     └─ stream(turns, model, modes)   → FragmentStream
//! ```

pub mod client;
pub mod error;
pub mod openai_compat;
pub mod provider;
pub mod registry;
pub mod sse;
pub mod types;

// Re-export commonly used types
pub use client::{ChatProvider, FragmentStream};
pub use error::ProviderError;
pub use openai_compat::{ModelCatalog, OpenAiCompatProvider, ProviderEndpoint};
pub use provider::ProviderKind;
pub use registry::{ProviderRegistry, ProviderSettings};
pub use types::{ChatTurn, GenerationParams, ModeFlags, ModelInfo, Role};
