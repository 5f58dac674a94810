//! # Services Layer
//!
//! Business logic between the HTTP handlers and the data/provider layers.
//!
//! ```text
//! Handlers (HTTP) → Services (Business Logic) → Repositories / Provider Clients
//! ```
//!
//! ## Module Organization
//!
//! - [`chat`] - Message orchestration (persist, compose, call provider, compensate)
//! - [`stream`] - Streaming relay task and its event type
//! - [`prompt`] - Prompt composition from mode flags and file context
//! - [`files`] - Upload validation and text extraction
//!
//! ## Error Handling
//!
//! All services return `Result<T, AppError>`. Provider failures keep their
//! classification through `AppError::Provider`.
//!
//! ## Testing
//!
//! Services are tested against an in-memory database and scripted
//! providers implementing [`lib_ai::ChatProvider`]:
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_send_message() {
//!     let fake = Arc::new(FakeProvider::replying(ProviderKind::OpenAi, "Hi!"));
//!     let state = test_state(Config::default(), vec![fake]).await;
//!     let service = ChatService::new(state.db, state.providers, &state.config);
//!     // ...
//! }
//! ```

pub mod chat;
pub mod files;
pub mod prompt;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat::ChatService;
pub use files::FileService;
pub use prompt::{ComposedPrompt, PromptComposer};
pub use stream::StreamEvent;
