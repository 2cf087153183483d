//! Chat gateway - forwards chat queries to the hosting service with bounded concurrency.

use std::sync::Arc;

use tokio::net::TcpListener;

use chat_gateway::{app, logging, AppState, Config, HostingClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()
        .map_err(|e| format!("Failed to load configuration: {}", e))?;

    logging::init(&config.logging.level);

    let backend = Arc::new(HostingClient::new(&config.hosting));
    let state = Arc::new(AppState::new(config, backend));

    tracing::info!(
        "Starting chat gateway: hosting={} max_concurrency={}",
        state.config.hosting.base_url,
        state.chat_service.max_concurrency()
    );

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
