//! Entry points used by the HTTP routes.

use std::sync::Arc;

use chat_gateway_common::{ChatQuery, ChatReply};

use super::aggregator::{self, BatchResult};
use super::{BatchDispatcher, ConcurrencyLimiter, FallbackOrchestrator, SingleDispatcher};
use crate::error::Result;
use crate::hosting::InferenceBackend;

/// Single-item and batch chat handling on top of one backend and one
/// shared limiter.
#[derive(Clone)]
pub struct ChatService {
    single: SingleDispatcher,
    batch: BatchDispatcher,
    fallback: FallbackOrchestrator,
    limiter: ConcurrencyLimiter,
}

impl ChatService {
    pub fn new(backend: Arc<dyn InferenceBackend>, limiter: ConcurrencyLimiter) -> Self {
        let single = SingleDispatcher::new(backend.clone(), limiter.clone());
        Self {
            batch: BatchDispatcher::new(backend, limiter.clone()),
            limiter,
            fallback: FallbackOrchestrator::new(single.clone()),
            single,
        }
    }

    /// Maximum simultaneous hosting-service calls, 0 when unlimited.
    pub fn max_concurrency(&self) -> usize {
        self.limiter.capacity()
    }

    /// Validate and dispatch one query.
    pub async fn chat(&self, query: &ChatQuery) -> Result<ChatReply> {
        query.validate()?;
        Ok(self.single.dispatch(query).await?)
    }

    /// Process a non-empty batch.
    ///
    /// The batch endpoint is tried first; if that call fails for any reason
    /// the batch is re-run item by item. Per-item failures never fail the
    /// batch as a whole.
    pub async fn chat_batched(&self, queries: &[ChatQuery]) -> BatchResult {
        let batch_id = uuid::Uuid::new_v4();
        tracing::info!(%batch_id, "Processing batch request with {} queries", queries.len());

        match self.batch.dispatch(queries).await {
            Ok(items) => {
                tracing::info!(
                    %batch_id,
                    "Batch endpoint processed {} queries in a single call",
                    queries.len()
                );
                aggregator::from_batch_reply(queries, &items)
            }
            Err(e) => {
                tracing::warn!(
                    %batch_id,
                    "Batch endpoint failed: {}, falling back to per-item processing",
                    e
                );
                let outcomes = self.fallback.run(queries).await;
                BatchResult::from_outcomes(outcomes)
            }
        }
    }
}
