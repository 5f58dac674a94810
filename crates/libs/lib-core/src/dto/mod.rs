//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged with the frontend over the REST API.

pub mod chat;
pub mod file;

pub use chat::*;
pub use file::*;
