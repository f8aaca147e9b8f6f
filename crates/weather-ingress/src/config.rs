//! Configuration for the ingress server, loaded from the environment.

use weather_types::{ConditionVocabulary, DEFAULT_REGIONS};

use crate::error::IngressError;
use crate::server::ServerConfig;

/// Default subject observations are published on.
pub const DEFAULT_SUBJECT: &str = "weather-tweets";

/// Default JetStream stream capturing the subject.
pub const DEFAULT_STREAM: &str = "WEATHER";

/// Complete ingress configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressConfig {
    /// NATS server URL.
    pub nats_url: String,
    /// Bind address.
    pub server: ServerConfig,
    /// Subject accepted observations are published on.
    pub subject: String,
    /// JetStream stream that persists the subject.
    pub stream: String,
    /// Accepted regions.
    pub regions: Vec<String>,
    /// Accepted conditions.
    pub vocabulary: ConditionVocabulary,
}

impl IngressConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `NATS_URL` -- NATS server connection string
    ///
    /// Optional variables:
    /// - `INGRESS_HOST` -- bind host (default `0.0.0.0`)
    /// - `INGRESS_PORT` -- bind port (default `8080`)
    /// - `WEATHER_SUBJECT` -- publish subject (default `weather-tweets`)
    /// - `WEATHER_STREAM` -- JetStream stream name (default `WEATHER`)
    /// - `INGRESS_REGIONS` -- comma-separated accepted regions
    /// - `WEATHER_CONDITIONS` -- comma-separated accepted conditions
    pub fn from_env() -> Result<Self, IngressError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IngressError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let nats_url = lookup("NATS_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| IngressError::Config(String::from("missing required env var NATS_URL")))?;

        let defaults = ServerConfig::default();
        let host = lookup("INGRESS_HOST").unwrap_or(defaults.host);
        let port = match lookup("INGRESS_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| IngressError::Config(format!("invalid INGRESS_PORT: {e}")))?,
            None => defaults.port,
        };

        let subject = lookup("WEATHER_SUBJECT").unwrap_or_else(|| DEFAULT_SUBJECT.to_owned());

        let stream = lookup("WEATHER_STREAM").unwrap_or_else(|| DEFAULT_STREAM.to_owned());

        let regions: Vec<String> = match lookup("INGRESS_REGIONS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_REGIONS.iter().map(|&r| r.to_owned()).collect(),
        };
        if regions.is_empty() {
            return Err(IngressError::Config(String::from(
                "INGRESS_REGIONS must list at least one region",
            )));
        }

        let vocabulary = match lookup("WEATHER_CONDITIONS") {
            Some(list) => ConditionVocabulary::parse_list(&list)
                .map_err(|e| IngressError::Config(format!("invalid WEATHER_CONDITIONS: {e}")))?,
            None => ConditionVocabulary::default(),
        };

        Ok(Self {
            nats_url,
            server: ServerConfig { host, port },
            subject,
            stream,
            regions,
            vocabulary,
        })
    }
}
