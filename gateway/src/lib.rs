pub mod config;
pub mod error;
pub mod gateway;
pub mod hosting;
pub mod logging;
pub mod routes;
pub mod state;
pub mod test_util;

pub use config::Config;
pub use error::Error;
pub use gateway::{BatchResult, ChatService, ConcurrencyLimiter, QueryOutcome};
pub use hosting::{DispatchError, HostingClient, InferenceBackend};
pub use state::AppState;

use std::sync::Arc;

use axum::middleware;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full HTTP application with logging and CORS layers.
pub fn app(state: Arc<AppState>) -> Router {
    routes::router()
        .layer(middleware::from_fn(logging::request_logger))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
