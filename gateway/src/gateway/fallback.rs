//! Per-item fallback used when the batch endpoint call fails.
//!
//! Every query gets its own task; all tasks are joined before the result is
//! built. Failures stay in their own slot and never cancel siblings.

use tokio::task::JoinSet;

use chat_gateway_common::ChatQuery;

use super::aggregator::QueryOutcome;
use super::SingleDispatcher;

/// Runs a batch as independent single-item dispatches.
#[derive(Clone)]
pub struct FallbackOrchestrator {
    dispatcher: SingleDispatcher,
}

impl FallbackOrchestrator {
    pub fn new(dispatcher: SingleDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Dispatch every query concurrently and return outcomes in input order.
    ///
    /// Invalid queries fail locally without a backend call. Dropping the
    /// returned future aborts the tasks still running.
    pub async fn run(&self, queries: &[ChatQuery]) -> Vec<QueryOutcome> {
        let mut tasks = JoinSet::new();
        for (index, query) in queries.iter().cloned().enumerate() {
            let dispatcher = self.dispatcher.clone();
            tasks.spawn(async move { (index, process_item(&dispatcher, query).await) });
        }

        let mut slots: Vec<Option<QueryOutcome>> = vec![None; queries.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!("Fallback task failed: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(queries)
            .map(|(slot, query)| {
                slot.unwrap_or_else(|| QueryOutcome::failure(query.chat_id.as_str(), "internal error"))
            })
            .collect()
    }
}

async fn process_item(dispatcher: &SingleDispatcher, query: ChatQuery) -> QueryOutcome {
    if let Err(e) = query.validate() {
        return QueryOutcome::failure(query.chat_id, e.to_string());
    }

    match dispatcher.dispatch(&query).await {
        Ok(reply) => QueryOutcome::success(query.chat_id, reply.response),
        Err(e) => {
            tracing::warn!(chat_id = %query.chat_id, "Fallback item failed: {}", e);
            QueryOutcome::failure(query.chat_id, e.item_message())
        }
    }
}
