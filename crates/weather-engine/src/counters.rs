//! Monotonic counters and running totals.
//!
//! Every update here is a single atomic store increment (or a plain set for
//! the last-observed readings), so these are exact under a single writer
//! and additive under many. A replayed event is counted twice.

use weather_store::{KeySchema, MetricStore, StoreError};
use weather_types::{ObservationEvent, Reading};

/// Increment `count(region, condition)`.
pub async fn count_condition<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    event: &ObservationEvent,
) -> Result<i64, StoreError> {
    store
        .increment(&keys.condition_count(&event.region, &event.condition))
        .await
}

/// Increment the global histogram bucket for the event's condition.
pub async fn count_condition_total<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    event: &ObservationEvent,
) -> Result<i64, StoreError> {
    store.increment(&keys.condition_total(&event.condition)).await
}

/// Increment the per-region bucket for the exact temperature observed.
pub async fn count_temperature_value<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    event: &ObservationEvent,
) -> Result<i64, StoreError> {
    let value = Reading::Temperature.of(event);
    store
        .increment(&keys.temperature_value(&event.region, value))
        .await
}

/// Increment `count(region)`.
pub async fn count_region<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    event: &ObservationEvent,
) -> Result<i64, StoreError> {
    store.increment(&keys.region_count(&event.region)).await
}

/// Add the event's `reading` to the region's running total.
pub async fn add_region_sum<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    event: &ObservationEvent,
    reading: Reading,
) -> Result<i64, StoreError> {
    store
        .increment_by(&keys.region_sum(&event.region, reading), reading.of(event))
        .await
}

/// Overwrite the region's last observed `reading`.
pub async fn record_latest<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    event: &ObservationEvent,
    reading: Reading,
) -> Result<(), StoreError> {
    store
        .set(
            &keys.latest(&event.region, reading),
            &reading.of(event).to_string(),
        )
        .await
}
