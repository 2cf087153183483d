use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use chat_gateway_common::{ChatQuery, ChatReply};

use crate::hosting::{BatchItem, DispatchError, InferenceBackend};

/// Hosting-service double that counts calls and peak concurrency.
///
/// By default every call succeeds with `"echo: <user_prompt>"`, and the
/// batch endpoint reports invalid queries as per-item errors the way the
/// real hosting service does.
#[derive(Default)]
pub struct MockBackend {
    delay: Duration,
    staggered_step: Option<Duration>,
    failing: HashSet<String>,
    unreachable: HashSet<String>,
    batch_missing: bool,
    batch_reply: Option<Vec<BatchItem>>,
    chat_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Single calls sleep `step * chat_id` (chat ids must be numeric).
    pub fn with_staggered_delay(mut self, step: Duration) -> Self {
        self.staggered_step = Some(step);
        self
    }

    /// `chat` for this id answers with HTTP 500.
    pub fn failing_chat(mut self, chat_id: &str) -> Self {
        self.failing.insert(chat_id.to_string());
        self
    }

    /// `chat` for this id fails at the transport level.
    pub fn unreachable_chat(mut self, chat_id: &str) -> Self {
        self.unreachable.insert(chat_id.to_string());
        self
    }

    /// `generate_batch` answers with HTTP 404.
    pub fn without_batch_endpoint(mut self) -> Self {
        self.batch_missing = true;
        self
    }

    /// `generate_batch` returns exactly these items.
    pub fn with_batch_reply(mut self, items: Vec<BatchItem>) -> Self {
        self.batch_reply = Some(items);
        self
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(&self.in_flight)
    }

    fn delay_for(&self, query: &ChatQuery) -> Duration {
        match self.staggered_step {
            Some(step) => step * query.chat_id.parse::<u32>().unwrap_or(0),
            None => self.delay,
        }
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn chat(&self, query: &ChatQuery) -> Result<ChatReply, DispatchError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter();
        tokio::time::sleep(self.delay_for(query)).await;

        if self.unreachable.contains(&query.chat_id) {
            return Err(DispatchError::Transport("connection refused".to_string()));
        }
        if self.failing.contains(&query.chat_id) {
            return Err(DispatchError::BackendStatus {
                status: 500,
                body: format!("mock failure for {}", query.chat_id),
            });
        }

        Ok(ChatReply {
            chat_id: query.chat_id.clone(),
            response: format!("echo: {}", query.user_prompt),
        })
    }

    async fn generate_batch(&self, queries: &[ChatQuery]) -> Result<Vec<BatchItem>, DispatchError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter();
        tokio::time::sleep(self.delay).await;

        if self.batch_missing {
            return Err(DispatchError::BackendStatus {
                status: 404,
                body: "Not Found".to_string(),
            });
        }
        if let Some(items) = &self.batch_reply {
            return Ok(items.clone());
        }

        Ok(queries
            .iter()
            .map(|query| {
                let value = match query.validate() {
                    Ok(()) => json!({
                        "chat_id": query.chat_id,
                        "response": format!("echo: {}", query.user_prompt),
                    }),
                    Err(e) => json!({ "chat_id": query.chat_id, "error": e.to_string() }),
                };
                match value {
                    serde_json::Value::Object(map) => map,
                    _ => BatchItem::new(),
                }
            })
            .collect())
    }
}
