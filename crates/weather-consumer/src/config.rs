//! Configuration for the consumer.
//!
//! All configuration is loaded from environment variables. The consumer
//! needs to know how to reach NATS and the metric store, which subject to
//! consume, and which condition labels are eligible for ranking.

use weather_store::KeySchema;
use weather_types::ConditionVocabulary;

use crate::error::ConsumerError;

/// Default subject observations are published on.
pub const DEFAULT_SUBJECT: &str = "weather-tweets";

/// Default JetStream stream capturing the observation subject.
pub const DEFAULT_STREAM: &str = "WEATHER";

/// Default durable consumer name shared by every consumer instance.
pub const DEFAULT_QUEUE_GROUP: &str = "weather-aggregators";

/// Complete consumer configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// NATS server URL (e.g. `nats://localhost:4222`).
    pub nats_url: String,
    /// Metric store URL (e.g. `redis://localhost:6379`).
    pub dragonfly_url: String,
    /// Subject carrying encoded observations.
    pub subject: String,
    /// JetStream stream that persists the subject.
    pub stream: String,
    /// Durable consumer name; instances sharing it split the stream.
    pub queue_group: String,
    /// Labels eligible for most/least common ranking, in tie-break order.
    pub vocabulary: ConditionVocabulary,
    /// Key layout, optionally prefixed.
    pub keys: KeySchema,
}

impl ConsumerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `NATS_URL` -- NATS server connection string
    /// - `DRAGONFLY_URL` -- metric store connection string
    ///
    /// Optional variables:
    /// - `WEATHER_SUBJECT` -- subject to consume (default `weather-tweets`)
    /// - `WEATHER_STREAM` -- JetStream stream name (default `WEATHER`)
    /// - `WEATHER_QUEUE_GROUP` -- durable consumer name (default `weather-aggregators`)
    /// - `WEATHER_CONDITIONS` -- comma-separated ranking vocabulary
    ///   (default `sunny,rainy,cloudy,foggy`)
    /// - `WEATHER_KEY_PREFIX` -- prefix for every metric key (default none)
    pub fn from_env() -> Result<Self, ConsumerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConsumerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConsumerError::Config(format!("missing required env var {name}")))
        };

        let nats_url = required("NATS_URL")?;
        let dragonfly_url = required("DRAGONFLY_URL")?;
        let subject = lookup("WEATHER_SUBJECT").unwrap_or_else(|| DEFAULT_SUBJECT.to_owned());
        let stream = lookup("WEATHER_STREAM").unwrap_or_else(|| DEFAULT_STREAM.to_owned());
        let queue_group =
            lookup("WEATHER_QUEUE_GROUP").unwrap_or_else(|| DEFAULT_QUEUE_GROUP.to_owned());

        let vocabulary = match lookup("WEATHER_CONDITIONS") {
            Some(list) => ConditionVocabulary::parse_list(&list)
                .map_err(|e| ConsumerError::Config(format!("invalid WEATHER_CONDITIONS: {e}")))?,
            None => ConditionVocabulary::default(),
        };

        let keys = lookup("WEATHER_KEY_PREFIX").map_or_else(KeySchema::new, KeySchema::with_prefix);

        Ok(Self {
            nats_url,
            dragonfly_url,
            subject,
            stream,
            queue_group,
            vocabulary,
            keys,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ConsumerConfig, ConsumerError> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ConsumerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[
            ("NATS_URL", "nats://localhost:4222"),
            ("DRAGONFLY_URL", "redis://localhost:6379"),
        ])
        .unwrap();
        assert_eq!(config.subject, "weather-tweets");
        assert_eq!(config.stream, "WEATHER");
        assert_eq!(config.queue_group, "weather-aggregators");
        assert_eq!(config.vocabulary, ConditionVocabulary::default());
        assert_eq!(config.keys, KeySchema::new());
    }

    #[test]
    fn overrides_apply() {
        let config = load(&[
            ("NATS_URL", "nats://nats:4222"),
            ("DRAGONFLY_URL", "redis://valkey:6379"),
            ("WEATHER_SUBJECT", "obs"),
            ("WEATHER_STREAM", "OBS"),
            ("WEATHER_QUEUE_GROUP", "blue"),
            ("WEATHER_CONDITIONS", "rainy,sunny"),
            ("WEATHER_KEY_PREFIX", "staging"),
        ])
        .unwrap();
        assert_eq!(config.subject, "obs");
        assert_eq!(config.stream, "OBS");
        assert_eq!(config.queue_group, "blue");
        assert_eq!(config.vocabulary.iter().collect::<Vec<_>>(), vec!["rainy", "sunny"]);
        assert_eq!(config.keys.region_count("x"), "staging:municipality:x:count");
    }

    #[test]
    fn missing_store_url_is_an_error() {
        let result = load(&[("NATS_URL", "nats://localhost:4222")]);
        assert!(matches!(result, Err(ConsumerError::Config(msg)) if msg.contains("DRAGONFLY_URL")));
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let result = load(&[
            ("NATS_URL", "nats://localhost:4222"),
            ("DRAGONFLY_URL", "redis://localhost:6379"),
            ("WEATHER_CONDITIONS", " , "),
        ]);
        assert!(matches!(result, Err(ConsumerError::Config(_))));
    }
}
