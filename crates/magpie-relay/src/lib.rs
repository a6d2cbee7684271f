//! Magpie Relay
//!
//! A same-origin pass-through relay: it forwards GET requests on the
//! caller's behalf so a browser-constrained client can fetch cross-origin
//! pages. The relay is deliberately blind. No validation, no allow-listing,
//! no header rewriting; the upstream status and body come back verbatim with
//! the content type normalized to plain text.

pub mod routes;

use anyhow::Result;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

pub use routes::router;

/// Bind and serve the relay on the given address.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener).await
}

/// Serve the relay on an already-bound listener. Useful for callers that
/// want an ephemeral port.
pub async fn serve_on(listener: TcpListener) -> Result<()> {
    info!("Relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await?;
    Ok(())
}
