//! Main entry point for the collaborative editing relay server.
//!
//! Serves one RGA replica per document over websockets using the Axum web framework.

use collab_rga::config::ServerConfig;
use collab_rga::error::Error;
use collab_rga::server::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting collaborative RGA relay...");

    let app = create_router(AppState::new(&config));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!("Server listening on http://{}", listener.local_addr()?);
    info!("Available endpoints:");
    info!("  GET  /health        - Health check");
    info!("  GET  /docs/:doc_id  - Current text of a document");
    info!("  GET  /ws/:doc_id    - Join a document over websocket");

    axum::serve(listener, app).await?;
    Ok(())
}
