//! comply-gateway - Edge reverse proxy for the compliance backend.
//!
//! Forwards browser traffic on `/api/proxy/{*path}` to the configured
//! backend origin with the service credential injected, relaying JSON,
//! binary downloads, and SSE streams without corruption.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use clap::Parser;
use comply_gateway::config::GatewayConfig;
use comply_gateway::proxy::AppState;
use comply_gateway::server;
use comply_gateway::upstream::BackendClient;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Listener configuration for the gateway.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "GATEWAY_PORT", default_value = "4040")]
    port: u16,

    /// Bind address
    #[arg(short, long, env = "GATEWAY_BIND", default_value = "127.0.0.1")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::from_env();

    if config.backend_url.is_empty() {
        warn!("BACKEND_URL is not set; proxy calls will fail until it is configured");
    }

    info!(
        bind = %cli.bind,
        port = cli.port,
        backend = %config.backend_url,
        api_key_configured = config.api_key.is_some(),
        "comply-gateway starting"
    );

    let backend = BackendClient::new(config)?;
    let state = Arc::new(AppState { backend });

    let listener = TcpListener::bind(format!("{}:{}", cli.bind, cli.port)).await?;
    server::run(listener, state).await?;

    Ok(())
}
