//! Error types for the gateway.
//!
//! The gateway performs no local recovery: backend-reported failures are
//! relayed verbatim (status and body), and only proxy-local failures are
//! synthesized into one of the variants below.

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur during gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Backend origin unset or URL construction failed (maps to 502)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend unreachable at the network layer (maps to 502)
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend declared `application/json` but the body failed to parse
    /// (maps to 502; never silently returns an empty body)
    #[error("Malformed upstream JSON: {0}")]
    UpstreamJson(String),

    /// Invalid inbound proxy path (maps to 400)
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl GatewayError {
    /// Convert the error to an HTTP response with the appropriate status code.
    ///
    /// Bodies are JSON: the callers of this surface are the product's own
    /// frontend API helpers, which expect structured errors.
    pub fn to_response(&self) -> Response {
        let status = match self {
            GatewayError::Configuration(_)
            | GatewayError::BackendUnavailable(_)
            | GatewayError::UpstreamJson(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        };

        let body = json!({ "error": self.to_string() });

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|_| {
                let mut resp = Response::new(Body::from(r#"{"error":"internal error"}"#));
                *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                resp
            })
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.to_response()
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
