//! The observation event exchanged between the ingress and the consumer.
//!
//! The JSON field names (`municipality`, `temperature`, `humidity`,
//! `weather`) are a wire contract shared with existing producers and must
//! not change. Inside Rust the fields carry their domain names.

use serde::{Deserialize, Serialize};

/// Errors raised while decoding or encoding an [`ObservationEvent`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload was not valid JSON for the observation schema.
    #[error("malformed observation payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but its region was empty.
    #[error("observation has an empty municipality")]
    EmptyRegion,
}

/// One region's weather reading.
///
/// Immutable once decoded; the aggregation engine consumes it once and
/// never retains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationEvent {
    /// Region (municipality) the reading belongs to. Never empty.
    #[serde(rename = "municipality")]
    pub region: String,
    /// Temperature in whole degrees. May be negative.
    pub temperature: i32,
    /// Humidity as a percentage-like integer. The range is not validated.
    pub humidity: i32,
    /// Free-form condition label such as `sunny`.
    #[serde(rename = "weather")]
    pub condition: String,
}

impl ObservationEvent {
    /// Build an observation from its parts.
    pub fn new(
        region: impl Into<String>,
        temperature: i32,
        humidity: i32,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            temperature,
            humidity,
            condition: condition.into(),
        }
    }

    /// Decode an observation from a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Json`] when the payload is not a valid
    /// observation object and [`DecodeError::EmptyRegion`] when the
    /// `municipality` field is empty.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let event: Self = serde_json::from_slice(payload)?;
        if event.region.trim().is_empty() {
            return Err(DecodeError::EmptyRegion);
        }
        Ok(event)
    }

    /// Encode the observation as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Json`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        Ok(serde_json::to_vec(self)?)
    }
}
