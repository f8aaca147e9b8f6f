//! The metric store capability consumed by the aggregation engine.
//!
//! The store is deliberately narrow: point reads and writes, atomic
//! increments, and a transactional batch of increments. There is no
//! compare-and-swap, so any read-modify-write built on top of it (such as
//! extremum tracking) is only safe with a single writer.

use std::future::Future;

use crate::error::StoreError;

/// One queued increment inside a [`MetricStore::transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Increment {
    /// Key to increment. Created at 0 when absent.
    pub key: String,
    /// Signed amount to add.
    pub delta: i64,
}

impl Increment {
    /// Increment `key` by `delta`.
    pub fn by(key: impl Into<String>, delta: i64) -> Self {
        Self {
            key: key.into(),
            delta,
        }
    }

    /// Increment `key` by one.
    pub fn one(key: impl Into<String>) -> Self {
        Self::by(key, 1)
    }
}

/// Key-value capability holding every derived metric.
///
/// Values are stored as strings, matching what dashboards read with `GET`.
/// Counters are integers rendered in base 10.
pub trait MetricStore: Send + Sync {
    /// Read the scalar at `key`. `None` means the key was never written.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Overwrite the scalar at `key`.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Atomically add one to the counter at `key`, returning the new value.
    fn increment(&self, key: &str) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Atomically add `delta` to the counter at `key`, returning the new value.
    fn increment_by(
        &self,
        key: &str,
        delta: i64,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Apply every increment in `ops` as one all-or-nothing batch.
    ///
    /// No reader observes a state where only part of the batch has been
    /// applied. Returns the new value of each key in `ops` order.
    fn transaction(
        &self,
        ops: &[Increment],
    ) -> impl Future<Output = Result<Vec<i64>, StoreError>> + Send;

    /// Read the scalar at `key` as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if the stored value is not an integer.
    fn get_int(&self, key: &str) -> impl Future<Output = Result<Option<i64>, StoreError>> + Send {
        async move {
            let Some(raw) = self.get(key).await? else {
                return Ok(None);
            };
            raw.trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_parse| StoreError::Parse {
                    key: key.to_owned(),
                    value: raw.clone(),
                })
        }
    }
}
