//! Content-type classification and the three relay paths.
//!
//! The backend speaks three transfer modes, selected at runtime from the
//! content-type header. The dispatch is modeled as a tagged variant decided
//! by a pure classification function, so each relay path stays independently
//! testable:
//!
//! - [`ResponseKind::Json`]: body parsed and re-serialized, backend status
//!   relayed.
//! - [`ResponseKind::Binary`]: body streamed through unmodified (file
//!   downloads must not be buffered or JSON-parsed).
//! - [`ResponseKind::EventStream`]: live SSE passthrough; bytes are relayed
//!   as they arrive, never aggregated until stream completion.
//!
//! Dropping a relay's response body drops the underlying
//! `reqwest::Response`, which aborts the backend connection. That is the
//! cancellation path for abandoned clients: an SSE session whose browser
//! went away does not keep consuming the backend stream.

use axum::body::Body;
use axum::response::Response;
use futures_util::TryStreamExt;
use http::{header, StatusCode};

use crate::error::{GatewayError, GatewayResult};

/// Transfer mode of a backend response, decided from its content-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// `application/json`: parse and re-serialize.
    Json,
    /// Anything else: opaque byte passthrough.
    Binary,
    /// `text/event-stream`: live SSE passthrough.
    EventStream,
}

/// Classify a backend response by its declared content-type.
pub fn classify_response(content_type: Option<&str>) -> ResponseKind {
    match content_type {
        Some(ct) if ct.contains("text/event-stream") => ResponseKind::EventStream,
        Some(ct) if ct.contains("application/json") => ResponseKind::Json,
        _ => ResponseKind::Binary,
    }
}

/// Body mode of an inbound POST, decided from the client's content-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `multipart/form-data`: raw bytes forwarded untouched, boundary
    /// preserved. Re-encoding the multipart structure would corrupt file
    /// uploads.
    Multipart,
    /// Everything else is assumed to be JSON and forwarded as text with
    /// content-type forced to `application/json`.
    Json,
}

/// Classify an inbound POST body by the client's declared content-type.
pub fn classify_request(content_type: Option<&str>) -> RequestKind {
    match content_type {
        Some(ct) if ct.contains("multipart/form-data") => RequestKind::Multipart,
        _ => RequestKind::Json,
    }
}

/// Relay a JSON response: parse, re-serialize, keep the backend status.
///
/// A body that fails to parse despite the declared (or assumed) JSON
/// content-type fails loudly as [`GatewayError::UpstreamJson`] rather than
/// silently returning an empty body.
pub async fn relay_json(upstream: reqwest::Response) -> GatewayResult<Response> {
    let status = upstream.status();

    let value: serde_json::Value = upstream
        .json()
        .await
        .map_err(|e| GatewayError::UpstreamJson(e.to_string()))?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .map_err(|e| GatewayError::UpstreamJson(e.to_string()))
}

/// Relay a binary response: stream the body through unmodified.
///
/// Forwards the backend's content-type and, when present, its
/// content-disposition header. No JSON parsing is attempted and the body is
/// never buffered whole.
pub fn relay_binary(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let disposition = upstream.headers().get(header::CONTENT_DISPOSITION).cloned();

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);

    let mut builder = Response::builder().status(status);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    if let Some(cd) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, cd);
    }

    builder
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| internal_error())
}

/// Relay an SSE response: pipe bytes through as they arrive.
///
/// Chunk boundaries are preserved by the stream adapter and the first byte
/// is relayed before the backend stream completes. `X-Accel-Buffering: no`
/// tells intermediary proxies not to buffer the stream.
pub fn relay_event_stream(upstream: reqwest::Response) -> Response {
    let status = upstream.status();

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| internal_error())
}

fn internal_error() -> Response {
    let mut resp = Response::new(Body::from(r#"{"error":"internal error"}"#));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}
