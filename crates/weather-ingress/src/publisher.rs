//! Delivery of encoded observations to the event channel.
//!
//! The only contract is "deliver this payload to a named subject". In
//! production the subject is captured by a JetStream stream and a publish
//! only succeeds once the stream has acknowledged storing the message, so
//! observations accepted while no consumer is running are not lost.
//! [`MemoryPublisher`] records payloads for tests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_nats::jetstream::{self, stream};
use tracing::{debug, info};

use crate::error::IngressError;

/// Sends an encoded observation to a subject.
pub trait Publisher: Send + Sync + 'static {
    /// Publish `payload` on `subject`.
    fn publish(
        &self,
        subject: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), IngressError>> + Send;
}

/// Stream configuration capturing `subject`.
pub fn stream_config(stream: &str, subject: &str) -> stream::Config {
    stream::Config {
        name: stream.to_owned(),
        subjects: vec![subject.to_owned()],
        ..Default::default()
    }
}

/// Publishes into a JetStream stream and waits for the storage ack.
#[derive(Clone)]
pub struct NatsPublisher {
    client: async_nats::Client,
    jetstream: jetstream::Context,
}

impl NatsPublisher {
    /// Connect to a NATS server and ensure `stream` captures `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`IngressError::Publish`] if the connection cannot be
    /// established or the stream cannot be created.
    pub async fn connect(url: &str, stream: &str, subject: &str) -> Result<Self, IngressError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| IngressError::Publish(format!("failed to connect to {url}: {e}")))?;
        let jetstream = jetstream::new(client.clone());
        jetstream
            .get_or_create_stream(stream_config(stream, subject))
            .await
            .map_err(|e| IngressError::Publish(format!("failed to open stream {stream}: {e}")))?;
        info!(stream = stream, subject = subject, "NATS JetStream ready");
        Ok(Self { client, jetstream })
    }
}

impl Publisher for NatsPublisher {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), IngressError> {
        debug!(subject = subject, payload_size = payload.len(), "publishing observation");
        let ack = self
            .jetstream
            .publish(subject.to_owned(), payload.into())
            .await
            .map_err(|e| IngressError::Publish(format!("failed to publish to {subject}: {e}")))?
            .await
            .map_err(|e| IngressError::Publish(format!("{subject} was not acknowledged: {e}")))?;
        debug!(stream = %ack.stream, sequence = ack.sequence, "observation stored");
        Ok(())
    }
}

impl std::fmt::Debug for NatsPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsPublisher")
            .field("connection", &self.client.connection_state())
            .finish_non_exhaustive()
    }
}

/// Records every published payload in memory.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
    failing: AtomicBool,
}

impl MemoryPublisher {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every `(subject, payload)` published so far, oldest first.
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Publisher for MemoryPublisher {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), IngressError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IngressError::Publish(format!(
                "publisher unavailable for {subject}"
            )));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((subject.to_owned(), payload));
        Ok(())
    }
}
