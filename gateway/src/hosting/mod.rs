//! Hosting service abstraction.
//!
//! This module defines the `InferenceBackend` trait that stands between the
//! dispatchers and the hosting service, and the reqwest-based client that
//! implements it.

mod client;

pub use client::HostingClient;

use async_trait::async_trait;
use chat_gateway_common::{ChatQuery, ChatReply};
use thiserror::Error;

/// One element of a batch reply, kept as the raw JSON object the hosting
/// service produced. Interpretation happens in the aggregator.
pub type BatchItem = serde_json::Map<String, serde_json::Value>;

/// Errors from a single call to the hosting service.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Connection failure, timeout or cancellation.
    #[error("Failed to reach hosting service: {0}")]
    Transport(String),
    /// Non-success HTTP status. The body is kept verbatim.
    #[error("Hosting service returned {status}: {body}")]
    BackendStatus { status: u16, body: String },
    #[error("Invalid response from hosting service: {0}")]
    Decode(String),
}

impl DispatchError {
    /// Per-item error text used when a failure is folded into a batch result.
    ///
    /// Only backend status errors expose details; everything else is
    /// reported as a generic outage.
    pub fn item_message(&self) -> String {
        match self {
            DispatchError::BackendStatus { body, .. } => format!("Model service error: {}", body),
            DispatchError::Transport(_) | DispatchError::Decode(_) => {
                "Model service temporarily unavailable".to_string()
            }
        }
    }
}

/// The two operations the hosting service exposes.
///
/// Implementations perform exactly one attempt per call and do no
/// concurrency limiting of their own.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Generate a reply for one query.
    async fn chat(&self, query: &ChatQuery) -> Result<ChatReply, DispatchError>;

    /// Generate replies for a whole batch in one call.
    ///
    /// On success the returned items are in request order.
    async fn generate_batch(&self, queries: &[ChatQuery]) -> Result<Vec<BatchItem>, DispatchError>;
}
