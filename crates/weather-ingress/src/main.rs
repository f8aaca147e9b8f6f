//! Ingress server entry point.
//!
//! Accepts observations over HTTP and publishes them to the NATS subject
//! the aggregation consumers read.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use weather_ingress::{AppState, IngressConfig, NatsPublisher, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("weather-ingress starting");

    let config = IngressConfig::from_env()?;
    info!(
        nats_url = %config.nats_url,
        subject = %config.subject,
        stream = %config.stream,
        regions = config.regions.len(),
        "configuration loaded"
    );

    let publisher =
        NatsPublisher::connect(&config.nats_url, &config.stream, &config.subject).await?;
    let state = Arc::new(AppState::new(
        publisher,
        config.subject,
        config.regions,
        config.vocabulary,
    ));

    start_server(&config.server, state).await?;
    Ok(())
}
