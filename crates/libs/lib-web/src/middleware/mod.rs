//! # Middleware
//!
//! Axum middleware applied to every route.
//!
//! ## Modules
//!
//! - **[`mw_req_stamp`]**: Request ID stamping (`X-Request-ID`)
//! - **[`mw_logging`]**: Request/response logging with header redaction

// region: --- Modules
pub mod mw_req_stamp;
pub mod mw_logging;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_req_stamp::{request_id, stamp_req, RequestStamp, REQUEST_ID_HEADER};
pub use mw_logging::log_requests;
// endregion: --- Re-exports
