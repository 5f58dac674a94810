//! # Utilities Library
//!
//! Shared helpers for environment variables, text shaping, and validation.

pub mod envs;
pub mod text;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_bool, get_env_list, get_env_or, get_env_parse_or};
pub use text::{excerpt, truncate_with_ellipsis};
pub use validation::{validate_not_empty, validate_range};
