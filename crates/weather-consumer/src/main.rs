//! Weather aggregation consumer entry point.
//!
//! Pulls encoded observations from a NATS subject and folds each one into
//! the derived metrics held in `Dragonfly`, where dashboards read them.
//!
//! # Architecture
//!
//! ```text
//! JetStream (weather-tweets) --> ack --> decode --> AggregationEngine --> Dragonfly
//! ```
//!
//! Failing to reach NATS or the store at startup is fatal. After that,
//! malformed payloads and store errors are logged per event and the loop
//! keeps going.

mod config;
mod consumer;
mod error;
mod source;

use tracing::info;
use tracing_subscriber::EnvFilter;
use weather_engine::{AggregationEngine, EngineConfig};
use weather_store::DragonflyStore;

use crate::config::ConsumerConfig;
use crate::consumer::Consumer;
use crate::source::{NatsEventSource, SourceBinding};

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// connects to the metric store and NATS, then consumes observations until
/// the subscription ends.
///
/// # Errors
///
/// Returns an error if configuration or startup connectivity fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("weather-consumer starting");

    let config = ConsumerConfig::from_env()?;
    info!(
        nats_url = %config.nats_url,
        subject = %config.subject,
        stream = %config.stream,
        queue_group = %config.queue_group,
        conditions = config.vocabulary.len(),
        "configuration loaded"
    );

    let store = DragonflyStore::connect(&config.dragonfly_url).await?;
    let source = NatsEventSource::connect(SourceBinding {
        url: &config.nats_url,
        stream: &config.stream,
        subject: &config.subject,
        durable: &config.queue_group,
    })
    .await?;

    let engine_config = EngineConfig::new(config.vocabulary).with_keys(config.keys);
    let mut consumer = Consumer::new(source, AggregationEngine::new(store, engine_config));

    info!("aggregation engine initialized, entering consumption loop");
    let stats = consumer.run().await;
    info!(
        received = stats.received,
        applied = stats.applied,
        malformed = stats.malformed,
        degraded = stats.degraded,
        "weather-consumer stopped"
    );

    Ok(())
}
