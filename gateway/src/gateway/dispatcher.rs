//! Single-item dispatch to the hosting service's `/chat` endpoint.

use std::sync::Arc;

use chat_gateway_common::{ChatQuery, ChatReply};

use super::ConcurrencyLimiter;
use crate::hosting::{DispatchError, InferenceBackend};

/// Sends one query to the hosting service under a limiter permit.
#[derive(Clone)]
pub struct SingleDispatcher {
    backend: Arc<dyn InferenceBackend>,
    limiter: ConcurrencyLimiter,
}

impl SingleDispatcher {
    pub fn new(backend: Arc<dyn InferenceBackend>, limiter: ConcurrencyLimiter) -> Self {
        Self { backend, limiter }
    }

    /// Dispatch one query. No retries.
    ///
    /// The permit is held only around the backend call and is released when
    /// this future completes or is dropped.
    pub async fn dispatch(&self, query: &ChatQuery) -> Result<ChatReply, DispatchError> {
        let _permit = self.limiter.acquire().await?;
        tracing::debug!(chat_id = %query.chat_id, "Dispatching chat query");
        self.backend.chat(query).await
    }
}
