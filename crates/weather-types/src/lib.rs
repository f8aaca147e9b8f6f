//! Shared type definitions for the weather aggregation pipeline.
//!
//! This crate is the single source of truth for the observation wire format
//! and the closed condition vocabulary. Both the ingress front door and the
//! aggregation consumer depend on it so producers and consumers can never
//! disagree on field names.
//!
//! # Modules
//!
//! - [`observation`] -- The [`ObservationEvent`] wire type and its codec
//! - [`reading`] -- The [`Reading`] kinds aggregated per observation
//! - [`vocabulary`] -- The ordered [`ConditionVocabulary`] and known regions

pub mod observation;
pub mod reading;
pub mod vocabulary;

// Re-export all public types at crate root for convenience.
pub use observation::{DecodeError, ObservationEvent};
pub use reading::Reading;
pub use vocabulary::{ConditionVocabulary, DEFAULT_CONDITIONS, DEFAULT_REGIONS, VocabularyError};
