//! Ingress API for the weather aggregation pipeline.
//!
//! This crate provides an Axum HTTP server that accepts one observation per
//! request, validates it against the known regions and condition
//! vocabulary, and publishes the encoded event to the NATS subject the
//! consumers read from.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/tweets` | Validate and publish one observation |
//! | `GET` | `/health` | Liveness check |
//!
//! Publishing goes through the [`Publisher`] trait so handlers can be
//! exercised without a NATS server.

pub mod config;
pub mod error;
pub mod handlers;
pub mod publisher;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use config::IngressConfig;
pub use error::IngressError;
pub use publisher::{MemoryPublisher, NatsPublisher, Publisher};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve, start_server};
pub use state::AppState;
