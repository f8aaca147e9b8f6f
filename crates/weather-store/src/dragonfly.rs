//! `Dragonfly` (Redis-compatible) metric store.
//!
//! Production deployments point this at `Dragonfly`, `Valkey` or Redis.
//! Plain commands map one-to-one onto [`MetricStore`]; transactions use
//! `MULTI`/`EXEC` so the batch is applied and made visible atomically.

use fred::prelude::*;

use crate::error::StoreError;
use crate::store::{Increment, MetricStore};

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`]. Cloning shares the connection.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Wrap an already-initialised client.
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), StoreError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for DragonflyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyStore")
            .field("connected", &self.client.is_connected())
            .finish()
    }
}

impl MetricStore for DragonflyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _: () = self.client.set(key, value, None, None, false).await?;
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let value: i64 = self.client.incr(key).await?;
        Ok(value)
    }

    async fn increment_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let value: i64 = self.client.incr_by(key, delta).await?;
        Ok(value)
    }

    async fn transaction(&self, ops: &[Increment]) -> Result<Vec<i64>, StoreError> {
        let trx = self.client.multi();
        for op in ops {
            // Queued locally; the reply arrives with EXEC.
            let _: Value = trx.incr_by(op.key.as_str(), op.delta).await?;
        }
        let results: Vec<i64> = trx.exec(true).await?;
        Ok(results)
    }
}
