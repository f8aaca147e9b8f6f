//! Global running max/min per reading.
//!
//! Each bound is a plain read followed by a conditional write. The store
//! offers no compare-and-swap, so two engines racing on the same bound can
//! lose an update: both read the old bound, both write, the last write
//! wins even if it is the weaker value. Deployments that need exact
//! extrema must run a single consumer. An absent key means no observation
//! has been seen yet; it is never read as zero.

use weather_store::{Bound, KeySchema, MetricStore, StoreError};
use weather_types::Reading;

/// Whether `candidate` should replace the `current` bound.
pub const fn improves(bound: Bound, candidate: i64, current: Option<i64>) -> bool {
    match current {
        None => true,
        Some(current) => match bound {
            Bound::Max => candidate > current,
            Bound::Min => candidate < current,
        },
    }
}

/// Fold `value` into the global `bound` of `reading`.
///
/// Returns `true` if the stored bound was replaced.
///
/// # Errors
///
/// Returns [`StoreError`] if the read or the write fails, including when
/// the stored bound is not an integer (it is left untouched).
pub async fn track<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    reading: Reading,
    bound: Bound,
    value: i64,
) -> Result<bool, StoreError> {
    let key = keys.extremum(reading, bound);
    let current = store.get_int(&key).await?;
    if !improves(bound, value, current) {
        return Ok(false);
    }
    store.set(&key, &value.to_string()).await?;
    Ok(true)
}
