//! Test helpers: an in-process hosting-service double and canned configs.

pub mod mock_backend;

pub use mock_backend::MockBackend;

use std::sync::Arc;

use crate::config::{Config, HostingConfig};
use crate::gateway::ConcurrencyLimiter;
use crate::hosting::HostingClient;
use crate::state::AppState;

pub fn test_config(hosting_url: &str, max_concurrency: usize) -> Config {
    Config {
        hosting: HostingConfig {
            base_url: hosting_url.to_string(),
            ..HostingConfig::default()
        },
        max_concurrency,
        ..Config::default()
    }
}

/// State backed by the real HTTP client, for use against a wiremock server.
pub fn create_test_state(hosting_url: &str, max_concurrency: usize) -> Arc<AppState> {
    let config = test_config(hosting_url, max_concurrency);
    let backend = Arc::new(HostingClient::new(&config.hosting));
    Arc::new(AppState::new(config, backend))
}

/// State backed by an in-process backend double.
pub fn create_mock_state(backend: Arc<MockBackend>, max_concurrency: usize) -> Arc<AppState> {
    let config = test_config("http://mock-hosting", max_concurrency);
    Arc::new(AppState::with_limiter(
        config,
        backend,
        ConcurrencyLimiter::new(max_concurrency),
    ))
}
