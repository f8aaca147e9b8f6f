//! Error types for the ingress API.
//!
//! [`IngressError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the same `{"status":"error","message":...}` shape
//! producers already expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use weather_types::DecodeError;

use crate::handlers::ApiResponse;

/// Errors that can occur in the ingress API layer.
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    /// The request body was not a valid observation.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The region is not one the pipeline accepts.
    #[error("invalid municipality: {0}")]
    InvalidRegion(String),

    /// The condition is not in the vocabulary.
    #[error("invalid weather: {0}")]
    InvalidCondition(String),

    /// The observation could not be encoded for publishing.
    #[error("encode error: {0}")]
    Encode(#[from] DecodeError),

    /// Publishing to the event channel failed.
    #[error("publish error: {0}")]
    Publish(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidJson(_) => (StatusCode::BAD_REQUEST, String::from("Invalid JSON")),
            Self::InvalidRegion(_) => {
                (StatusCode::BAD_REQUEST, String::from("Invalid municipality"))
            }
            Self::InvalidCondition(_) => (StatusCode::BAD_REQUEST, String::from("Invalid weather")),
            Self::Publish(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                String::from("Observation could not be forwarded"),
            ),
            Self::Encode(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("encode error: {e}")),
            Self::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, axum::Json(ApiResponse::error(message))).into_response()
    }
}
