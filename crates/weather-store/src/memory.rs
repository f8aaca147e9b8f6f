//! In-process [`MetricStore`] used by tests and local runs.
//!
//! Every operation takes one mutex, so each call (and each transaction as
//! a whole) is atomic with respect to every other call, which is exactly
//! the visibility contract of the real store. Clones share state.
//!
//! Transport failures can be injected per key substring with
//! [`MemoryStore::fail_keys_matching`] to exercise partial-failure paths.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;
use crate::store::{Increment, MetricStore};

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, String>,
    failing: Vec<String>,
}

impl Inner {
    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.failing.iter().any(|pattern| key.contains(pattern.as_str())) {
            return Err(StoreError::Unavailable {
                key: key.to_owned(),
            });
        }
        Ok(())
    }

    fn counter(&self, key: &str) -> Result<i64, StoreError> {
        match self.values.get(key) {
            None => Ok(0),
            Some(raw) => raw.parse::<i64>().map_err(|_parse| StoreError::Parse {
                key: key.to_owned(),
                value: raw.clone(),
            }),
        }
    }

    fn bumped(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.check(key)?;
        self.counter(key)?
            .checked_add(delta)
            .ok_or_else(|| StoreError::Overflow {
                key: key.to_owned(),
            })
    }
}

/// Shared in-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every operation on a key containing `pattern` fail with
    /// [`StoreError::Unavailable`] until [`heal`](Self::heal) is called.
    pub fn fail_keys_matching(&self, pattern: impl Into<String>) {
        self.lock().failing.push(pattern.into());
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        self.lock().failing.clear();
    }

    /// Copy of every stored key and value.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().values.clone()
    }

    /// Raw value at `key`, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }

    /// Remove every key. Injected failures are kept.
    pub fn clear(&self) {
        self.lock().values.clear();
    }
}

impl MetricStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.lock();
        inner.check(key)?;
        Ok(inner.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.check(key)?;
        inner.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        self.increment_by(key, 1).await
    }

    async fn increment_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        let next = inner.bumped(key, delta)?;
        inner.values.insert(key.to_owned(), next.to_string());
        Ok(next)
    }

    async fn transaction(&self, ops: &[Increment]) -> Result<Vec<i64>, StoreError> {
        let mut inner = self.lock();

        // Stage against a scratch map so a failure leaves nothing applied.
        let mut staged: BTreeMap<&str, i64> = BTreeMap::new();
        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            inner.check(&op.key)?;
            let current = match staged.get(op.key.as_str()) {
                Some(&value) => value,
                None => inner.counter(&op.key)?,
            };
            let next = current
                .checked_add(op.delta)
                .ok_or_else(|| StoreError::Overflow {
                    key: op.key.clone(),
                })?;
            staged.insert(op.key.as_str(), next);
            results.push(next);
        }

        for (key, value) in staged {
            inner.values.insert(key.to_owned(), value.to_string());
        }
        Ok(results)
    }
}
