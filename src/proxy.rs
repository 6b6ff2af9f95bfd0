//! Wildcard proxy handlers and router assembly.
//!
//! The browser-facing surface is `/api/proxy/{*path}` for GET, POST, and
//! DELETE. Each handler is a single linear request/response exchange with
//! exactly one branch decision per direction: inbound content-type for POST,
//! outbound content-type for GET/POST. DELETE always treats the backend
//! response as JSON (deletions return structured confirmations, never files
//! or streams).

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue};
use tracing::info;

use crate::error::GatewayResult;
use crate::relay::{self, RequestKind, ResponseKind};
use crate::upstream::BackendClient;

/// Shared handler state: the pooled backend client, nothing else.
///
/// There is no cross-request state; every entity a handler creates lives
/// for a single invocation.
pub struct AppState {
    pub backend: BackendClient,
}

/// Assemble the gateway router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/proxy/{*path}",
            get(handle_get).post(handle_post).delete(handle_delete),
        )
        .layer(crate::logging_layer::logging_layer())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Response {
    Response::builder()
        .status(http::StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"status":"ok"}"#))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// GET passthrough: JSON or binary per the backend's content-type.
async fn handle_get(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> GatewayResult<Response> {
    let upstream = state.backend.get(&path, query.as_deref()).await?;

    match relay::classify_response(content_type(upstream.headers())) {
        ResponseKind::Json => relay::relay_json(upstream).await,
        // GET has no SSE branch: a stream response is relayed as opaque
        // bytes, which is behavior-identical for a one-way stream.
        ResponseKind::Binary | ResponseKind::EventStream => Ok(relay::relay_binary(upstream)),
    }
}

/// POST passthrough: multipart or JSON inbound, SSE or JSON outbound.
async fn handle_post(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> GatewayResult<Response> {
    let inbound = content_type(&headers);

    let forward_content_type = match relay::classify_request(inbound) {
        // The original multipart content-type (boundary parameter included)
        // is preserved verbatim; re-encoding would corrupt file uploads.
        RequestKind::Multipart => headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("multipart/form-data")),
        // Non-multipart POST bodies are assumed to be JSON.
        RequestKind::Json => HeaderValue::from_static("application/json"),
    };

    let upstream = state.backend.post(&path, forward_content_type, body).await?;

    match relay::classify_response(content_type(upstream.headers())) {
        ResponseKind::EventStream => {
            info!(path = %path, "Relaying event stream");
            Ok(relay::relay_event_stream(upstream))
        }
        ResponseKind::Json | ResponseKind::Binary => relay::relay_json(upstream).await,
    }
}

/// DELETE passthrough: always JSON, regardless of declared content-type.
async fn handle_delete(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> GatewayResult<Response> {
    let upstream = state.backend.delete(&path, query.as_deref()).await?;
    relay::relay_json(upstream).await
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}
