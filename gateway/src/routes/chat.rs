//! Chat endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use chat_gateway_common::{BatchedRequest, ChatQuery, ChatReply};

use crate::error::{Error, Result};
use crate::gateway::BatchResult;
use crate::state::AppState;

/// Build the chat router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/batched", post(chat_batched))
}

/// POST /chat - Forward one query to the hosting service.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatQuery>, JsonRejection>,
) -> Result<Json<ChatReply>> {
    let Json(query) = payload?;
    let reply = state.chat_service.chat(&query).await?;
    Ok(Json(reply))
}

/// POST /chat/batched - Process a batch, always 200 once the body is valid.
async fn chat_batched(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<BatchedRequest>, JsonRejection>,
) -> Result<Json<BatchResult>> {
    let Json(request) = payload?;
    if request.queries.is_empty() {
        return Err(Error::InvalidRequest(
            "queries array required and must be non-empty".to_string(),
        ));
    }

    let result = state.chat_service.chat_batched(&request.queries).await;
    Ok(Json(result))
}
