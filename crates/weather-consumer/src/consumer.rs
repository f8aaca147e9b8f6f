//! The sequential consumption loop.
//!
//! One payload is pulled, decoded and fully applied before the next one is
//! pulled. Malformed payloads are dropped with a warning; partially failed
//! events are counted as degraded. Neither ever stops the loop.

use tracing::{debug, info, warn};
use weather_engine::AggregationEngine;
use weather_store::MetricStore;
use weather_types::ObservationEvent;

use crate::source::EventSource;

/// Counters describing one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Payloads pulled from the source.
    pub received: u64,
    /// Observations decoded and applied.
    pub applied: u64,
    /// Payloads dropped because they did not decode.
    pub malformed: u64,
    /// Applied observations where at least one metric group failed.
    pub degraded: u64,
}

/// Pulls observations from a source and feeds them to the engine.
pub struct Consumer<Src, S> {
    source: Src,
    engine: AggregationEngine<S>,
}

impl<Src: EventSource, S: MetricStore> Consumer<Src, S> {
    /// Create a consumer over a ready source and engine.
    pub const fn new(source: Src, engine: AggregationEngine<S>) -> Self {
        Self { source, engine }
    }

    /// Run until the source ends.
    ///
    /// Returns the counters accumulated over the run.
    pub async fn run(&mut self) -> ConsumerStats {
        info!("consumer started, awaiting observations");
        let mut stats = ConsumerStats::default();

        while let Some(payload) = self.source.next_payload().await {
            stats.received = stats.received.saturating_add(1);
            debug!(payload_size = payload.len(), "received observation message");

            match ObservationEvent::decode(&payload) {
                Ok(event) => {
                    let report = self.engine.apply(&event).await;
                    stats.applied = stats.applied.saturating_add(1);
                    if !report.is_clean() {
                        stats.degraded = stats.degraded.saturating_add(1);
                        warn!(
                            region = %event.region,
                            failed_groups = report.failures().len(),
                            "observation applied with failed metric groups"
                        );
                    }
                }
                Err(e) => {
                    stats.malformed = stats.malformed.saturating_add(1);
                    warn!(
                        error = %e,
                        payload_size = payload.len(),
                        "failed to decode observation, skipping"
                    );
                }
            }
        }

        info!(
            received = stats.received,
            applied = stats.applied,
            malformed = stats.malformed,
            degraded = stats.degraded,
            "event source closed, consumer shutting down"
        );
        stats
    }

    /// The engine driven by this consumer.
    pub const fn engine(&self) -> &AggregationEngine<S> {
        &self.engine
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;

    use weather_engine::EngineConfig;
    use weather_store::MemoryStore;

    use super::*;

    /// Replays a fixed list of payloads, then ends.
    struct ScriptedSource {
        payloads: VecDeque<Vec<u8>>,
    }

    impl ScriptedSource {
        fn new(payloads: &[&[u8]]) -> Self {
            Self {
                payloads: payloads.iter().map(|p| p.to_vec()).collect(),
            }
        }
    }

    impl EventSource for ScriptedSource {
        async fn next_payload(&mut self) -> Option<Vec<u8>> {
            self.payloads.pop_front()
        }
    }

    fn consumer(payloads: &[&[u8]]) -> Consumer<ScriptedSource, MemoryStore> {
        Consumer::new(
            ScriptedSource::new(payloads),
            AggregationEngine::new(MemoryStore::new(), EngineConfig::default()),
        )
    }

    #[tokio::test]
    async fn malformed_payload_does_not_stop_the_loop() {
        let mut consumer = consumer(&[
            br#"{"municipality":"mixco","temperature":10,"humidity":50,"weather":"sunny"}"#,
            b"{not json",
            br#"{"municipality":"","temperature":99,"humidity":99,"weather":"sunny"}"#,
            br#"{"municipality":"guatemala","temperature":20,"humidity":70,"weather":"rainy"}"#,
        ]);

        let stats = consumer.run().await;
        assert_eq!(
            stats,
            ConsumerStats {
                received: 4,
                applied: 2,
                malformed: 2,
                degraded: 0,
            }
        );

        let store = consumer.engine().store();
        assert_eq!(store.peek("municipality:mixco:count").as_deref(), Some("1"));
        assert_eq!(store.peek("municipality:guatemala:count").as_deref(), Some("1"));
        assert_eq!(store.peek("metrics:temperature:max").as_deref(), Some("20"));
        assert_eq!(store.peek("metrics:humedad:max").as_deref(), Some("70"));
    }

    #[tokio::test]
    async fn store_failures_are_counted_as_degraded() {
        let mut consumer = consumer(&[
            br#"{"municipality":"mixco","temperature":10,"humidity":50,"weather":"sunny"}"#,
            br#"{"municipality":"mixco","temperature":12,"humidity":55,"weather":"sunny"}"#,
        ]);
        consumer.engine().store().fail_keys_matching("metrics:");

        let stats = consumer.run().await;
        assert_eq!(stats.applied, 2);
        assert_eq!(stats.degraded, 2);
        assert_eq!(
            consumer.engine().store().peek("weather:mixco:condition:sunny").as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn empty_source_ends_immediately() {
        let mut consumer = consumer(&[]);
        assert_eq!(consumer.run().await, ConsumerStats::default());
        assert!(consumer.engine().store().is_empty());
    }
}
