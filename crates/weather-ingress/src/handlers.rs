//! Request handlers for the ingress API.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use weather_types::ObservationEvent;

use crate::error::IngressError;
use crate::publisher::Publisher;
use crate::state::AppState;

/// Body returned by every ingress endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `success` or `error`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
    /// Identifier assigned to an accepted observation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    /// When an accepted observation was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

impl ApiResponse {
    /// A success body stamped with a fresh request ID and timestamp.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: String::from("success"),
            message: message.into(),
            request_id: Some(Uuid::now_v7()),
            received_at: Some(Utc::now()),
        }
    }

    /// An error body.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: String::from("error"),
            message: message.into(),
            request_id: None,
            received_at: None,
        }
    }
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `POST /api/tweets` -- validate one observation and publish it.
pub async fn receive_tweet<P: Publisher>(
    State(state): State<Arc<AppState<P>>>,
    body: Result<Json<ObservationEvent>, JsonRejection>,
) -> Result<Json<ApiResponse>, IngressError> {
    let request_number = state.next_request_number();
    let Json(event) = body.map_err(|e| IngressError::InvalidJson(e.body_text()))?;

    info!(
        request = request_number,
        region = %event.region,
        temperature = event.temperature,
        humidity = event.humidity,
        condition = %event.condition,
        "received observation"
    );

    state.validate(&event)?;
    let payload = event.encode()?;
    state.publisher.publish(&state.subject, payload).await?;

    Ok(Json(ApiResponse::success(format!(
        "Tweet processed (Request #{request_number})"
    ))))
}
