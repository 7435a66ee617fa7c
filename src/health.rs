//! HTTP liveness endpoint.

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

pub const HEALTH_BODY: &str = "Bot is running!";

/// Builds the liveness router.
pub fn router() -> Router {
    Router::new().route("/", get(|| async { HEALTH_BODY }))
}

/// Binds `0.0.0.0:port` and serves the liveness router until the task is dropped.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Health endpoint listening on port {}", port);
    axum::serve(listener, router()).await
}
