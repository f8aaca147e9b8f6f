//! Event source: where encoded observations come from.
//!
//! The consumer pulls one payload at a time. In production the payloads
//! arrive through a durable JetStream pull consumer bound to the
//! observation subject. Every instance sharing the same durable name splits
//! the stream between them, and messages published while no consumer is
//! running are kept by the stream until one connects. Each message is
//! acknowledged as soon as it is received, before it is applied, so a crash
//! mid-update loses that event's effect rather than replaying it.

use std::future::Future;

use async_nats::jetstream::{self, consumer, stream};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::error::ConsumerError;

/// A pull-based, ordered stream of encoded observation payloads.
pub trait EventSource {
    /// Wait for the next payload. `None` means the stream has ended.
    fn next_payload(&mut self) -> impl Future<Output = Option<Vec<u8>>> + Send;
}

/// Where the durable consumer attaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBinding<'a> {
    /// NATS server URL.
    pub url: &'a str,
    /// JetStream stream capturing `subject`. Created when missing.
    pub stream: &'a str,
    /// Subject carrying encoded observations.
    pub subject: &'a str,
    /// Durable consumer name shared by every instance.
    pub durable: &'a str,
}

/// Stream configuration for the observation subject.
pub fn stream_config(stream: &str, subject: &str) -> stream::Config {
    stream::Config {
        name: stream.to_owned(),
        subjects: vec![subject.to_owned()],
        ..Default::default()
    }
}

/// Durable pull consumer configuration with explicit acknowledgement.
pub fn consumer_config(durable: &str, subject: &str) -> consumer::pull::Config {
    consumer::pull::Config {
        durable_name: Some(durable.to_owned()),
        filter_subject: subject.to_owned(),
        ack_policy: consumer::AckPolicy::Explicit,
        deliver_policy: consumer::DeliverPolicy::All,
        ..Default::default()
    }
}

/// Durable JetStream pull consumer yielding observation payloads.
pub struct NatsEventSource {
    client: async_nats::Client,
    messages: consumer::pull::Stream,
    durable: String,
}

impl NatsEventSource {
    /// Connect to NATS, ensure the stream exists and attach the durable
    /// consumer.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Nats`] if the connection, the stream, the
    /// consumer or the message subscription cannot be established.
    pub async fn connect(binding: SourceBinding<'_>) -> Result<Self, ConsumerError> {
        let SourceBinding {
            url,
            stream,
            subject,
            durable,
        } = binding;

        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| ConsumerError::Nats(format!("failed to connect to {url}: {e}")))?;
        info!("NATS connection established");

        let context = jetstream::new(client.clone());
        let handle = context
            .get_or_create_stream(stream_config(stream, subject))
            .await
            .map_err(|e| ConsumerError::Nats(format!("failed to open stream {stream}: {e}")))?;
        debug!(stream = stream, subject = subject, "observation stream ready");

        let consumer: consumer::PullConsumer = handle
            .get_or_create_consumer(durable, consumer_config(durable, subject))
            .await
            .map_err(|e| ConsumerError::Nats(format!("failed to attach consumer {durable}: {e}")))?;
        let messages = consumer
            .messages()
            .await
            .map_err(|e| ConsumerError::Nats(format!("failed to pull from {durable}: {e}")))?;
        info!(
            stream = stream,
            subject = subject,
            durable = durable,
            "attached durable observation consumer"
        );

        Ok(Self {
            client,
            messages,
            durable: durable.to_owned(),
        })
    }
}

impl EventSource for NatsEventSource {
    async fn next_payload(&mut self) -> Option<Vec<u8>> {
        loop {
            let message = match self.messages.next().await? {
                Ok(message) => message,
                Err(e) => {
                    warn!(durable = %self.durable, error = %e, "pull failed, retrying");
                    continue;
                }
            };
            if let Err(e) = message.ack().await {
                warn!(durable = %self.durable, error = %e, "failed to acknowledge observation");
            }
            return Some(message.payload.to_vec());
        }
    }
}

impl std::fmt::Debug for NatsEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsEventSource")
            .field("durable", &self.durable)
            .field("connection", &self.client.connection_state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stream_captures_the_observation_subject() {
        let config = stream_config("WEATHER", "weather-tweets");
        assert_eq!(config.name, "WEATHER");
        assert_eq!(config.subjects, vec![String::from("weather-tweets")]);
    }

    #[test]
    fn consumer_is_durable_with_explicit_acks() {
        let config = consumer_config("weather-aggregators", "weather-tweets");
        assert_eq!(config.durable_name.as_deref(), Some("weather-aggregators"));
        assert_eq!(config.filter_subject, "weather-tweets");
        assert_eq!(config.ack_policy, consumer::AckPolicy::Explicit);
        assert_eq!(config.deliver_policy, consumer::DeliverPolicy::All);
    }

    // Integration tests that require a live NATS server are marked #[ignore].
    #[tokio::test]
    #[ignore = "requires live NATS server with JetStream (docker compose up -d)"]
    async fn connect_and_attach() {
        let result = NatsEventSource::connect(SourceBinding {
            url: "nats://localhost:4222",
            stream: "WEATHER_TEST",
            subject: "weather-tweets-test",
            durable: "test-group",
        })
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore = "requires live NATS server with JetStream (docker compose up -d)"]
    async fn observation_published_before_attach_is_delivered() {
        let client = async_nats::connect("nats://localhost:4222").await.unwrap();
        let context = jetstream::new(client);
        context
            .get_or_create_stream(stream_config("WEATHER_LATE", "weather-tweets-late"))
            .await
            .unwrap();
        context
            .publish("weather-tweets-late", "queued".into())
            .await
            .unwrap()
            .await
            .unwrap();

        let mut source = NatsEventSource::connect(SourceBinding {
            url: "nats://localhost:4222",
            stream: "WEATHER_LATE",
            subject: "weather-tweets-late",
            durable: "late-group",
        })
        .await
        .unwrap();
        let payload = source.next_payload().await.unwrap();
        assert_eq!(payload, b"queued".to_vec());
    }
}
