//! Whole-batch dispatch to the hosting service's `/generate_batch` endpoint.
//!
//! The batch call is one backend request, so it takes one limiter permit
//! regardless of how many queries it carries.

use std::sync::Arc;

use chat_gateway_common::ChatQuery;

use super::ConcurrencyLimiter;
use crate::hosting::{BatchItem, DispatchError, InferenceBackend};

/// Sends a whole batch to the hosting service in one call.
#[derive(Clone)]
pub struct BatchDispatcher {
    backend: Arc<dyn InferenceBackend>,
    limiter: ConcurrencyLimiter,
}

impl BatchDispatcher {
    pub fn new(backend: Arc<dyn InferenceBackend>, limiter: ConcurrencyLimiter) -> Self {
        Self { backend, limiter }
    }

    /// Dispatch the batch.
    ///
    /// Any error means the whole call failed and none of its data may be
    /// used. Per-item error fields inside a successful reply are passed
    /// through untouched.
    pub async fn dispatch(&self, queries: &[ChatQuery]) -> Result<Vec<BatchItem>, DispatchError> {
        let items = {
            let _permit = self.limiter.acquire().await?;
            self.backend.generate_batch(queries).await?
        };

        if items.len() != queries.len() {
            return Err(DispatchError::Decode(format!(
                "expected {} batch items, got {}",
                queries.len(),
                items.len()
            )));
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::MockBackend;
    use std::time::Duration;

    fn queries(n: usize) -> Vec<ChatQuery> {
        (0..n).map(|i| ChatQuery::new(i.to_string(), "hi")).collect()
    }

    #[tokio::test]
    async fn test_batch_uses_single_backend_call() {
        let backend = Arc::new(MockBackend::new());
        let dispatcher = BatchDispatcher::new(backend.clone(), ConcurrencyLimiter::new(2));

        let items = dispatcher.dispatch(&queries(5)).await.unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(items[3]["chat_id"], "3");
        assert_eq!(backend.batch_calls(), 1);
        assert_eq!(backend.chat_calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_takes_one_permit() {
        let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(100)));
        let limiter = ConcurrencyLimiter::new(3);
        let dispatcher = BatchDispatcher::new(backend.clone(), limiter.clone());

        let batch = queries(10);
        let handle = tokio::spawn(async move { dispatcher.dispatch(&batch).await });
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(limiter.available_permits(), Some(2));
        handle.await.unwrap().unwrap();
        assert_eq!(limiter.available_permits(), Some(3));
    }

    #[tokio::test]
    async fn test_batch_endpoint_failure_is_returned() {
        let backend = Arc::new(MockBackend::new().without_batch_endpoint());
        let limiter = ConcurrencyLimiter::new(1);
        let dispatcher = BatchDispatcher::new(backend, limiter.clone());

        let err = dispatcher.dispatch(&queries(2)).await.unwrap_err();

        assert!(matches!(err, DispatchError::BackendStatus { status: 404, .. }));
        assert_eq!(limiter.available_permits(), Some(1));
    }

    #[tokio::test]
    async fn test_short_reply_is_malformed() {
        let backend = Arc::new(MockBackend::new().with_batch_reply(vec![serde_json::Map::new()]));
        let dispatcher = BatchDispatcher::new(backend, ConcurrencyLimiter::new(1));

        let err = dispatcher.dispatch(&queries(2)).await.unwrap_err();

        assert!(matches!(err, DispatchError::Decode(_)));
    }
}
