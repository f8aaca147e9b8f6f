//! Metric store layer for the weather aggregation pipeline.
//!
//! All derived statistics live in a shared key-value store (`Dragonfly`,
//! `Valkey` or Redis) that dashboards read with plain `GET`s. The engine
//! never talks to a concrete client; it is handed something implementing
//! [`MetricStore`], which lets tests run against [`MemoryStore`].
//!
//! # Architecture
//!
//! ```text
//! AggregationEngine
//!     |
//!     +-- KeySchema (key composition) --+
//!     |                                 |
//!     +-- MetricStore --+-- DragonflyStore (fred, production)
//!                       +-- MemoryStore    (in-process, tests)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`MetricStore`] capability trait and [`Increment`]
//! - [`keys`] -- [`KeySchema`], the single source of key names
//! - [`memory`] -- In-memory [`MemoryStore`] with failure injection
//! - [`dragonfly`] -- [`DragonflyStore`] backed by a [`fred`] client
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod keys;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use dragonfly::DragonflyStore;
pub use error::StoreError;
pub use keys::{Bound, KeySchema, Rank, metric_segment};
pub use memory::MemoryStore;
pub use store::{Increment, MetricStore};
