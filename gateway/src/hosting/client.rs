use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use chat_gateway_common::{ChatQuery, ChatReply};

use super::{BatchItem, DispatchError, InferenceBackend};
use crate::config::HostingConfig;

/// Client for the hosting service's HTTP API.
pub struct HostingClient {
    http_client: Client,
    base_url: String,
    chat_timeout: Duration,
    batch_timeout: Duration,
}

/// Batch request format expected by `/generate_batch`.
#[derive(Debug, Serialize)]
struct GenerateBatchRequest<'a> {
    queries: &'a [ChatQuery],
}

/// Batch response format. Elements are checked to be objects after decoding.
#[derive(Debug, Deserialize)]
struct GenerateBatchResponse {
    responses: Vec<serde_json::Value>,
}

impl HostingClient {
    pub fn new(config: &HostingConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
            batch_timeout: Duration::from_secs(config.batch_timeout_secs),
        }
    }

    /// POST a JSON body and return the raw body text of a successful reply.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        timeout: Duration,
    ) -> Result<String, DispatchError> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("Sending request to hosting service: {}", url);

        let response = self
            .http_client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(DispatchError::BackendStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl InferenceBackend for HostingClient {
    async fn chat(&self, query: &ChatQuery) -> Result<ChatReply, DispatchError> {
        let body = self.post_json("/chat", query, self.chat_timeout).await?;
        serde_json::from_str(&body).map_err(|e| DispatchError::Decode(e.to_string()))
    }

    async fn generate_batch(&self, queries: &[ChatQuery]) -> Result<Vec<BatchItem>, DispatchError> {
        let request = GenerateBatchRequest { queries };
        let body = self
            .post_json("/generate_batch", &request, self.batch_timeout)
            .await?;

        let decoded: GenerateBatchResponse =
            serde_json::from_str(&body).map_err(|e| DispatchError::Decode(e.to_string()))?;

        decoded
            .responses
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                serde_json::Value::Object(map) => Ok(map),
                other => Err(DispatchError::Decode(format!(
                    "batch item {} is not an object: {}",
                    i, other
                ))),
            })
            .collect()
    }
}
