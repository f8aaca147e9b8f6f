//! Error types for the consumer.
//!
//! Only startup can fail: once the loop is running, decode and store
//! errors are logged per event and never surface here.

use weather_store::StoreError;

/// Errors that can occur while starting the consumer.
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    /// Failed to connect to or subscribe on the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// Failed to reach the metric store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),
}
