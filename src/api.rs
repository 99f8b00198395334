//! Liveness HTTP listener
//!
//! The hosting platform polls this port to decide whether the bot is alive.

mod handlers;

pub use handlers::create_router;

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Bind the liveness port on all interfaces
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Health listener bound");
    Ok(listener)
}

/// Serve the liveness router until `shutdown` is cancelled
pub async fn serve(listener: TcpListener, shutdown: CancellationToken) -> std::io::Result<()> {
    axum::serve(listener, create_router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
