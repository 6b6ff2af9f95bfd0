//! Centralized configuration for the gateway.
//!
//! Configuration is resolved once at process startup and injected into the
//! handler state, rather than read from the environment per call. This keeps
//! the "backend unreachable because misconfigured" failure mode testable via
//! construction instead of environment mutation.

use std::time::Duration;

/// Runtime configuration for the gateway's upstream side.
///
/// All parameters can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the backend origin (e.g., "http://localhost:8000").
    ///
    /// Empty when neither `BACKEND_URL` nor `PUBLIC_API_URL` is set; in that
    /// case every proxy call fails with a connection error rather than
    /// silently defaulting to some origin.
    pub backend_url: String,

    /// Optional service API key, attached to every forwarded request as an
    /// `X-API-Key` header. Absence omits the header; it is not an error.
    pub api_key: Option<String>,

    /// Connection timeout (TCP + TLS handshake). No total request timeout is
    /// imposed: SSE sessions are held open for the lifetime of the stream
    /// and are bounded only by client disconnect.
    pub connect_timeout: Duration,

    /// Maximum idle connections per host in the upstream pool.
    pub pool_max_idle_per_host: usize,

    /// Idle connection timeout for the upstream pool.
    pub pool_idle_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            api_key: None,
            connect_timeout: Duration::from_secs(5),
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// # Environment Variables
    ///
    /// - `BACKEND_URL`: backend origin; falls back to `PUBLIC_API_URL`
    /// - `BACKEND_API_KEY` (optional): service credential for `X-API-Key`
    /// - `GATEWAY_CONNECT_TIMEOUT_SECS` (default: 5)
    /// - `GATEWAY_POOL_MAX_IDLE_PER_HOST` (default: 32)
    /// - `GATEWAY_POOL_IDLE_TIMEOUT_SECS` (default: 90)
    pub fn from_env() -> Self {
        let default = Self::default();

        let backend_url = std::env::var("BACKEND_URL")
            .or_else(|_| std::env::var("PUBLIC_API_URL"))
            .unwrap_or_default();

        let api_key = std::env::var("BACKEND_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        Self {
            backend_url,
            api_key,
            connect_timeout: std::env::var("GATEWAY_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.connect_timeout),
            pool_max_idle_per_host: std::env::var("GATEWAY_POOL_MAX_IDLE_PER_HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.pool_max_idle_per_host),
            pool_idle_timeout: std::env::var("GATEWAY_POOL_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.pool_idle_timeout),
        }
    }

    /// Create a config with the specified backend origin.
    ///
    /// Uses default values for all other settings.
    pub fn with_backend_url(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Default::default()
        }
    }

    /// Attach a service API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
