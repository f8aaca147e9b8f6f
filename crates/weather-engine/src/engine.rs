//! The aggregation engine: one observation in, one ordered batch of metric
//! updates out.
//!
//! [`AggregationEngine::apply`] runs every metric group for every event in
//! a fixed order. Groups are independent: a store failure in one is logged,
//! recorded in the returned [`ApplyReport`], and the next group still runs.
//! Nothing is retried; the source's at-least-once delivery is the only
//! redundancy, and a replayed event is double counted.

use std::fmt;

use tracing::{debug, warn};
use weather_store::{Bound, MetricStore, StoreError};
use weather_types::{ObservationEvent, Reading};

use crate::config::EngineConfig;
use crate::ranking::Ranking;
use crate::{average, counters, extrema, ranking};

/// One independently updated group of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroup {
    /// `count(region, condition)`.
    ConditionCount,
    /// Global condition histogram bucket.
    ConditionTotal,
    /// Per-region temperature value histogram bucket.
    TemperatureValue,
    /// `count(region)`.
    RegionCount,
    /// Running total of one reading for the region.
    RegionSum(Reading),
    /// Last observed value of one reading for the region.
    Latest(Reading),
    /// Transactional sum/count pair and recomputed average.
    Average(Reading),
    /// One global bound of one reading.
    Extremum(Reading, Bound),
    /// Most/least common condition write-back.
    Ranking,
}

impl fmt::Display for MetricGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConditionCount => f.write_str("condition_count"),
            Self::ConditionTotal => f.write_str("condition_total"),
            Self::TemperatureValue => f.write_str("temperature_value"),
            Self::RegionCount => f.write_str("region_count"),
            Self::RegionSum(reading) => write!(f, "{reading}_sum"),
            Self::Latest(reading) => write!(f, "{reading}_latest"),
            Self::Average(reading) => write!(f, "{reading}_avg"),
            Self::Extremum(reading, bound) => write!(f, "{reading}_{}", bound.as_str()),
            Self::Ranking => f.write_str("ranking"),
        }
    }
}

/// A metric group that failed while applying one event.
#[derive(Debug)]
pub struct GroupFailure {
    /// The group that failed.
    pub group: MetricGroup,
    /// The store error that stopped it.
    pub error: StoreError,
}

/// Outcome of applying one event.
#[derive(Debug, Default)]
pub struct ApplyReport {
    failures: Vec<GroupFailure>,
    ranking: Option<Ranking>,
}

impl ApplyReport {
    /// Whether every group succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every failed group with its error, in update order.
    pub fn failures(&self) -> &[GroupFailure] {
        &self.failures
    }

    /// Failed groups in update order.
    pub fn failed_groups(&self) -> impl Iterator<Item = MetricGroup> + '_ {
        self.failures.iter().map(|f| f.group)
    }

    /// The ranking written back for the event's region, if any.
    pub const fn ranking(&self) -> Option<&Ranking> {
        self.ranking.as_ref()
    }

    fn record<T>(&mut self, region: &str, group: MetricGroup, result: Result<T, StoreError>) {
        if let Err(error) = result {
            warn!(
                region = region,
                group = %group,
                error = %error,
                "metric update failed, continuing with remaining groups"
            );
            self.failures.push(GroupFailure { group, error });
        }
    }
}

/// Folds observations into derived metrics held in a [`MetricStore`].
///
/// One engine processes events sequentially. Several engines may share a
/// store; only the sum/count pairs behind averages are protected against
/// interleaving, extrema and rankings are best-effort under concurrency.
#[derive(Debug)]
pub struct AggregationEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: MetricStore> AggregationEngine<S> {
    /// Create an engine over a ready store.
    pub const fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The store this engine writes to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The engine's configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply every metric update for one event.
    ///
    /// Order: condition counter, region totals, running averages, global
    /// extrema, condition ranking. Never fails as a whole; inspect the
    /// returned report for per-group failures.
    pub async fn apply(&self, event: &ObservationEvent) -> ApplyReport {
        let store = &self.store;
        let keys = &self.config.keys;
        let region = event.region.as_str();
        let mut report = ApplyReport::default();

        // Step 1: condition counters.
        report.record(
            region,
            MetricGroup::ConditionCount,
            counters::count_condition(store, keys, event).await,
        );
        report.record(
            region,
            MetricGroup::ConditionTotal,
            counters::count_condition_total(store, keys, event).await,
        );
        report.record(
            region,
            MetricGroup::TemperatureValue,
            counters::count_temperature_value(store, keys, event).await,
        );

        // Step 2: region totals.
        report.record(
            region,
            MetricGroup::RegionCount,
            counters::count_region(store, keys, event).await,
        );
        for reading in Reading::ALL {
            report.record(
                region,
                MetricGroup::RegionSum(reading),
                counters::add_region_sum(store, keys, event, reading).await,
            );
        }
        for reading in Reading::ALL {
            report.record(
                region,
                MetricGroup::Latest(reading),
                counters::record_latest(store, keys, event, reading).await,
            );
        }

        // Step 3: running averages.
        for reading in Reading::ALL {
            report.record(
                region,
                MetricGroup::Average(reading),
                average::update_average(
                    store,
                    keys,
                    region,
                    reading,
                    reading.of(event),
                    self.config.recompute_delay,
                )
                .await,
            );
        }

        // Step 4: global extrema.
        for reading in Reading::ALL {
            for bound in [Bound::Max, Bound::Min] {
                report.record(
                    region,
                    MetricGroup::Extremum(reading, bound),
                    extrema::track(store, keys, reading, bound, reading.of(event)).await,
                );
            }
        }

        // Step 5: condition ranking.
        match self.recompute_ranking(region).await {
            Ok(ranking) => report.ranking = ranking,
            Err(e) => report.record::<()>(region, MetricGroup::Ranking, Err(e)),
        }

        debug!(
            region = region,
            condition = %event.condition,
            temperature = event.temperature,
            humidity = event.humidity,
            failed_groups = report.failures.len(),
            "observation applied"
        );
        report
    }

    /// Recompute and write back the condition ranking for `region`.
    ///
    /// Safe to call at any time; with no new events it rewrites the same
    /// labels.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a counter read or the write-back fails.
    pub async fn recompute_ranking(&self, region: &str) -> Result<Option<Ranking>, StoreError> {
        ranking::recompute(&self.store, &self.config.keys, &self.config.vocabulary, region).await
    }
}
