//! Running averages recomputed from a dedicated sum/count pair.
//!
//! The update is two phases:
//!
//! 1. **Transactional increment** -- `sum += value` and `count += 1` are
//!    applied as one store transaction, so no reader ever sees one without
//!    the other.
//! 2. **Best-effort recompute** -- sum and count are read back with two
//!    independent reads and `avg = sum / count` is written with two
//!    decimals.
//!
//! Phase 2 is not atomic. Another writer committing between the two
//! phases makes this recompute include that writer's contribution, and a
//! slower writer may overwrite a fresher average with a stale one. The
//! average converges on the next event for the region.

use std::time::Duration;

use weather_store::{Increment, KeySchema, MetricStore, StoreError};
use weather_types::Reading;

/// Render `sum / count` with two decimal places.
///
/// Returns `None` when `count` is not positive.
pub fn format_average(sum: i64, count: i64) -> Option<String> {
    if count <= 0 {
        return None;
    }
    // Counters never approach 2^53, so the conversion is exact in practice.
    #[allow(clippy::cast_precision_loss)]
    let average = sum as f64 / count as f64;
    Some(format!("{average:.2}"))
}

/// Fold `value` into the running average of `reading` for `region`.
///
/// Returns the average written, or `None` if the read-back count was not
/// positive (nothing is written in that case).
///
/// # Errors
///
/// Returns the first [`StoreError`] hit. If the transaction fails nothing
/// was applied; if the recompute fails the sum/count pair is updated but
/// the stored average is stale until the next event.
pub async fn update_average<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    region: &str,
    reading: Reading,
    value: i64,
    recompute_delay: Option<Duration>,
) -> Result<Option<String>, StoreError> {
    let sum_key = keys.average_sum(region, reading);
    let count_key = keys.average_count(region, reading);

    store
        .transaction(&[
            Increment::by(sum_key.as_str(), value),
            Increment::one(count_key.as_str()),
        ])
        .await?;

    if let Some(delay) = recompute_delay {
        tokio::time::sleep(delay).await;
    }

    let sum = store.get_int(&sum_key).await?.unwrap_or(0);
    let count = store.get_int(&count_key).await?.unwrap_or(0);

    let Some(average) = format_average(sum, count) else {
        return Ok(None);
    };
    store.set(&keys.average(region, reading), &average).await?;
    Ok(Some(average))
}
