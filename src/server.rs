//! Listener bind and serve loop with graceful shutdown.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::proxy::{self, AppState};

/// Serve the gateway on the given listener until a shutdown signal arrives.
///
/// In-flight exchanges (including open SSE sessions) are allowed to drain;
/// new connections stop being accepted as soon as the signal is received.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let app = proxy::router(state);

    info!(addr = %listener.local_addr()?, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolve when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
            Err(e) => error!(error = %e, "Failed to listen for SIGINT"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown");
            }
            Err(e) => error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
