//! # Web Library
//!
//! HTTP handlers, middleware, server setup and the chat services behind them.

pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;

pub use server::{create_router, start_server, AppState, ServerConfig};
