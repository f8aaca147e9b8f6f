//! Axum router construction for the ingress API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::publisher::Publisher;
use crate::state::AppState;

/// Build the complete Axum router for the ingress server.
///
/// The router includes:
/// - `POST /api/tweets` -- validate and publish one observation
/// - `GET /health` -- liveness check
///
/// CORS is configured to allow any origin so browser-based load
/// generators can post directly.
pub fn build_router<P: Publisher>(state: Arc<AppState<P>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/tweets", post(handlers::receive_tweet::<P>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
