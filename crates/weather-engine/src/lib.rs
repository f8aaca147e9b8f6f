//! Streaming aggregation engine for weather observations.
//!
//! The engine consumes one [`ObservationEvent`] at a time and applies a
//! fixed, ordered batch of metric updates against a [`MetricStore`]:
//!
//! 1. Per-region condition counter
//! 2. Per-region totals (count, temperature sum, humidity sum)
//! 3. Running averages (transactional increment, then best-effort recompute)
//! 4. Global extrema (read-then-write, single-writer safe only)
//! 5. Per-region condition ranking over a closed vocabulary
//!
//! A failure in one metric group is logged and reported in the
//! [`ApplyReport`]; it never stops the remaining groups from running.
//!
//! # Modules
//!
//! - [`config`] -- [`EngineConfig`] (vocabulary, key schema, test hooks)
//! - [`engine`] -- [`AggregationEngine`] and its per-event report
//! - [`counters`] -- Monotonic counters and running totals
//! - [`average`] -- Running averages recomputed from sum and count
//! - [`extrema`] -- Global max/min tracking
//! - [`ranking`] -- Most/least common condition per region
//!
//! [`ObservationEvent`]: weather_types::ObservationEvent
//! [`MetricStore`]: weather_store::MetricStore

pub mod average;
pub mod config;
pub mod counters;
pub mod engine;
pub mod extrema;
pub mod ranking;

// Re-export primary types for convenience.
pub use config::EngineConfig;
pub use engine::{AggregationEngine, ApplyReport, GroupFailure, MetricGroup};
pub use ranking::Ranking;
