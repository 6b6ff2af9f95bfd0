//! Backend HTTP client with connection pooling.
//!
//! Maintains persistent connections to the backend origin and forwards
//! requests with the service credential attached. Errors from the transport
//! layer are classified into [`GatewayError`] variants; HTTP-level backend
//! errors (non-2xx) are *not* errors here — they are relayed verbatim to the
//! caller by the handler layer.
//!
//! # Security
//!
//! - The API key never reaches the browser; it is injected here, on the
//!   server side of the proxy hop.
//! - No automatic retry (prevents duplicate side effects on the backend).

use bytes::Bytes;
use http::HeaderValue;
use reqwest::Client;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

/// Header carrying the service credential on every forwarded request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Pooled client for the backend origin.
///
/// `Clone` is cheap and the client can be shared across tasks; reqwest
/// handles connection pooling internally.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    config: GatewayConfig,
}

impl BackendClient {
    /// Create a new backend client from resolved configuration.
    ///
    /// No total request timeout is set: the SSE relay path holds the
    /// connection open for the lifetime of the stream, bounded only by
    /// client disconnect.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("client build failed: {e}")))?;

        Ok(Self { client, config })
    }

    /// Construct the target URL for a forwarded request.
    ///
    /// The target is always the fixed `/api` prefix joined with the supplied
    /// path; the path is never interpreted as an absolute URL, so it cannot
    /// escape the backend's API namespace. The query string is appended
    /// verbatim.
    pub fn build_url(&self, path: &str, query: Option<&str>) -> GatewayResult<String> {
        let base = self.config.backend_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(GatewayError::Configuration(
                "backend origin is not configured (set BACKEND_URL)".to_string(),
            ));
        }

        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(GatewayError::InvalidPath("empty proxy path".to_string()));
        }

        let mut url = format!("{base}/api/{path}");
        if let Some(q) = query {
            if !q.is_empty() {
                url.push('?');
                url.push_str(q);
            }
        }
        Ok(url)
    }

    /// Forward a GET to the backend.
    pub async fn get(&self, path: &str, query: Option<&str>) -> GatewayResult<reqwest::Response> {
        let url = self.build_url(path, query)?;
        debug!(url = %url, "Forwarding GET to backend");

        let mut req = self.client.get(&url);
        req = self.with_credential(req);
        req.send().await.map_err(|e| self.classify_error(e))
    }

    /// Forward a POST to the backend with the given content-type and raw body.
    ///
    /// The handler layer decides the content-type: the original multipart
    /// value (boundary included) for uploads, or forced `application/json`
    /// for everything else. The body bytes are forwarded untouched either way.
    pub async fn post(
        &self,
        path: &str,
        content_type: HeaderValue,
        body: Bytes,
    ) -> GatewayResult<reqwest::Response> {
        let url = self.build_url(path, None)?;
        debug!(url = %url, content_type = ?content_type, "Forwarding POST to backend");

        let mut req = self
            .client
            .post(&url)
            .header(http::header::CONTENT_TYPE, content_type)
            .body(body);
        req = self.with_credential(req);
        req.send().await.map_err(|e| self.classify_error(e))
    }

    /// Forward a DELETE to the backend.
    pub async fn delete(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> GatewayResult<reqwest::Response> {
        let url = self.build_url(path, query)?;
        debug!(url = %url, "Forwarding DELETE to backend");

        let mut req = self.client.delete(&url);
        req = self.with_credential(req);
        req.send().await.map_err(|e| self.classify_error(e))
    }

    /// Attach the service credential header if one is configured.
    ///
    /// Absence of the key omits the header; unauthenticated forwarding is a
    /// valid degraded mode, not an error.
    fn with_credential(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.header(API_KEY_HEADER, key),
            None => req,
        }
    }

    /// Classify a reqwest transport error into a [`GatewayError`].
    fn classify_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_builder() {
            GatewayError::Configuration(format!(
                "invalid backend origin {:?}: {error}",
                self.config.backend_url
            ))
        } else {
            GatewayError::BackendUnavailable(error.to_string())
        }
    }
}
