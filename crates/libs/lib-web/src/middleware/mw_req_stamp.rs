//! # Request Stamping Middleware
//!
//! Gives every request an ID that shows up in logs, trace spans and the
//! `X-Request-ID` response header. A well-formed ID sent by the caller is
//! kept so a frontend can correlate its own logs; anything else is replaced
//! by a fresh UUID.
//!
//! The stamp is available in handlers via `Extension<RequestStamp>`:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use lib_web::middleware::RequestStamp;
//!
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//! ```

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::SystemTime;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied ID that is reused.
const MAX_CALLER_ID_LEN: usize = 64;

/// Request metadata for tracing and debugging.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    /// Unique request identifier
    pub id: String,
    /// Time the request entered the stack
    pub timestamp: SystemTime,
}

impl RequestStamp {
    fn new(caller_id: Option<&str>) -> Self {
        let id = caller_id
            .filter(|id| is_acceptable_id(id))
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            id,
            timestamp: SystemTime::now(),
        }
    }
}

fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_CALLER_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Request ID of a stamped request, or `unknown`.
pub fn request_id<B>(req: &axum::http::Request<B>) -> String {
    req.extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Stamp the request and echo the ID on the response.
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let caller_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok());
    let stamp = RequestStamp::new(caller_id);

    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    res
}
