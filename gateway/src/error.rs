//! HTTP-facing error type for the gateway.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use chat_gateway_common::QueryValidationError;

use crate::hosting::DispatchError;

/// Errors that terminate a request with a non-200 status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Validation(#[from] QueryValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::InvalidRequest(_) | Error::Validation(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            Error::Dispatch(DispatchError::BackendStatus { status, body }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({ "error": "Model service error", "details": body }),
            ),
            Error::Dispatch(e) => {
                tracing::warn!("Hosting service unavailable: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Model service temporarily unavailable" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
