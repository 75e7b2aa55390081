//! Request identification and accounting.
//!
//! # Responsibilities
//! - Name the request-id header shared by the set/propagate layers
//! - Open one tracing span per request, tagged with its id
//! - Count completed requests by status
//!
//! # Design Decisions
//! - Request ID is assigned before anything else runs, so every log line carries it
//! - An id supplied by the client is kept as-is

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::observability::metrics;

/// Header carrying the request id, inbound and outbound.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request id of `request`, or `"unknown"` if the header is missing or not UTF-8.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span factory for `TraceLayer`.
pub fn make_span<B>(request: &Request<B>) -> tracing::Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Middleware recording every completed request.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    metrics::record_http_request(response.status().as_u16(), start);
    response
}
