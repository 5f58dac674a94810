//! # Core Library
//!
//! Configuration, error handling, persistence and DTOs for the chat backend.

pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::{Config, StreamFailurePolicy};
pub use error::{AppError, Result};
pub use model::store::{create_memory_pool, create_pool, DbPool};
