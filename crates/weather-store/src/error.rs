//! Error types for the metric store layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! [`fred`] error with context about which key was involved where one is
//! known.

/// Errors that can occur while talking to the metric store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A stored scalar could not be interpreted as an integer.
    #[error("value at {key} is not an integer: {value:?}")]
    Parse {
        /// The key that was read.
        key: String,
        /// The raw stored value.
        value: String,
    },

    /// An increment would overflow a signed 64-bit counter.
    #[error("increment on {key} would overflow")]
    Overflow {
        /// The key that was being incremented.
        key: String,
    },

    /// The store could not be reached for this key.
    #[error("store unavailable for key {key}")]
    Unavailable {
        /// The key the failed operation touched.
        key: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
