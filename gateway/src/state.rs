//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::gateway::{ChatService, ConcurrencyLimiter};
use crate::hosting::InferenceBackend;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub config: Config,
    pub chat_service: ChatService,
}

impl AppState {
    /// Build state with a limiter sized from `config.max_concurrency`.
    pub fn new(config: Config, backend: Arc<dyn InferenceBackend>) -> Self {
        let limiter = ConcurrencyLimiter::new(config.max_concurrency);
        Self::with_limiter(config, backend, limiter)
    }

    pub fn with_limiter(
        config: Config,
        backend: Arc<dyn InferenceBackend>,
        limiter: ConcurrencyLimiter,
    ) -> Self {
        Self {
            config,
            chat_service: ChatService::new(backend, limiter),
        }
    }
}
