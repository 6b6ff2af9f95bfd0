//! Mock compliance backend for integration testing.
//!
//! Serves a fixed set of `/api/*` routes covering every transfer mode the
//! gateway relays: JSON, binary download (with and without
//! content-disposition), declared-JSON-but-garbage, multipart/JSON capture,
//! a delayed two-event SSE stream, and a JSON-body-with-plain-text-type
//! delete confirmation. Every request is captured for assertions.
//!
//! Note: Some accessors are provided for future test expansion and may not
//! be used by every test file. They are marked with `#[allow(dead_code)]`.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use bytes::Bytes;
use futures_util::StreamExt;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Binary payload served by the download routes. Contains NUL and non-UTF8
/// bytes so corruption by text handling would be caught.
pub const FILE_BYTES: &[u8] = b"%PDF-1.7\x00\x01\x02 binary \xff\xfe payload";

/// The two SSE events emitted by the chat route, in order.
pub const SSE_FIRST_EVENT: &str = "data: {\"type\":\"text\",\"content\":\"Hi\"}\n\n";
pub const SSE_SECOND_EVENT: &str = "data: {\"type\":\"done\"}\n\n";

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    /// Full path + query as received (e.g. "/api/clients?status=active").
    pub uri: String,
    pub content_type: Option<String>,
    pub api_key: Option<String>,
    pub body: Bytes,
}

#[derive(Debug)]
struct MockState {
    requests: RwLock<Vec<CapturedRequest>>,
    /// Delay between the first and second SSE event.
    sse_delay: Duration,
}

impl MockState {
    async fn capture(&self, method: &str, uri: &Uri, headers: &HeaderMap, body: Bytes) {
        let captured = CapturedRequest {
            method: method.to_string(),
            uri: uri.to_string(),
            content_type: headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            api_key: headers
                .get("x-api-key")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            body,
        };
        self.requests.write().await.push(captured);
    }
}

/// Mock backend server.
#[derive(Debug, Clone)]
pub struct MockBackend {
    sse_delay: Duration,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            sse_delay: Duration::from_millis(400),
        }
    }

    /// Override the delay between the two SSE events.
    #[must_use]
    pub fn with_sse_delay(mut self, delay: Duration) -> Self {
        self.sse_delay = delay;
        self
    }

    /// Start the mock server and return its address and handle.
    pub async fn start(self) -> (SocketAddr, MockBackendHandle) {
        let state = Arc::new(MockState {
            requests: RwLock::new(Vec::new()),
            sse_delay: self.sse_delay,
        });

        let app = Router::new()
            .route("/api/clients", get(get_clients))
            .route("/api/kb/documents/{id}/download", get(get_download))
            .route("/api/raw", get(get_raw))
            .route("/api/missing", get(get_missing))
            .route("/api/badjson", get(get_badjson))
            .route("/api/classify", post(post_classify))
            .route("/api/client-documents/{client}/upload", post(post_upload))
            .route("/api/consult/chat", post(post_chat))
            .route("/api/kb/documents/{id}", delete(delete_document))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (
            addr,
            MockBackendHandle {
                state,
                _handle: handle,
            },
        )
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the running mock backend.
pub struct MockBackendHandle {
    state: Arc<MockState>,
    _handle: JoinHandle<()>,
}

impl MockBackendHandle {
    /// Number of requests received.
    pub async fn request_count(&self) -> usize {
        self.state.requests.read().await.len()
    }

    /// The most recent request received.
    pub async fn last_request(&self) -> Option<CapturedRequest> {
        self.state.requests.read().await.last().cloned()
    }
}

async fn get_clients(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.capture("GET", &uri, &headers, Bytes::new()).await;
    json_response(StatusCode::OK, json!({"items": [{"id": "c1"}]}))
}

async fn get_download(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.capture("GET", &uri, &headers, Bytes::new()).await;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{id}.pdf\""),
        )
        .body(Body::from(FILE_BYTES))
        .unwrap()
}

async fn get_raw(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.capture("GET", &uri, &headers, Bytes::new()).await;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(FILE_BYTES))
        .unwrap()
}

async fn get_missing(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.capture("GET", &uri, &headers, Bytes::new()).await;
    json_response(StatusCode::NOT_FOUND, json!({"detail": "not found"}))
}

async fn get_badjson(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.capture("GET", &uri, &headers, Bytes::new()).await;
    // Declares JSON but the body does not parse.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not-json{{"))
        .unwrap()
}

async fn post_classify(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.capture("POST", &uri, &headers, body).await;
    json_response(StatusCode::OK, json!({"received": true}))
}

async fn post_upload(
    State(state): State<Arc<MockState>>,
    Path(_client): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.capture("POST", &uri, &headers, body).await;
    json_response(StatusCode::OK, json!({"status": "pending"}))
}

async fn post_chat(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.capture("POST", &uri, &headers, body).await;

    let delay = state.sse_delay;
    let events = vec![
        Bytes::from_static(SSE_FIRST_EVENT.as_bytes()),
        Bytes::from_static(SSE_SECOND_EVENT.as_bytes()),
    ];

    // First event is emitted immediately; the second after the configured
    // delay, so a relay that aggregates the whole stream is detectable.
    let stream =
        futures_util::stream::iter(events.into_iter().enumerate()).then(move |(i, chunk)| {
            async move {
                if i > 0 {
                    tokio::time::sleep(delay).await;
                }
                Ok::<Bytes, Infallible>(chunk)
            }
        });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(stream))
        .unwrap()
}

async fn delete_document(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.capture("DELETE", &uri, &headers, Bytes::new()).await;
    // Valid JSON body, but declared as plain text: exercises the gateway's
    // unconditional JSON parsing on the DELETE path.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(
            json!({"status": "deleted", "document_id": id}).to_string(),
        ))
        .unwrap()
}

fn json_response(status: StatusCode, value: serde_json::Value) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}
