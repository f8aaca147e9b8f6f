//! Shared application state for the ingress API.

use std::sync::atomic::{AtomicU64, Ordering};

use weather_types::{ConditionVocabulary, ObservationEvent};

use crate::error::IngressError;

/// State shared by every request handler.
#[derive(Debug)]
pub struct AppState<P> {
    /// Where accepted observations are sent.
    pub publisher: P,
    /// Subject accepted observations are published on.
    pub subject: String,
    /// Regions accepted by the front door.
    pub regions: Vec<String>,
    /// Conditions accepted by the front door.
    pub vocabulary: ConditionVocabulary,
    request_count: AtomicU64,
}

impl<P> AppState<P> {
    /// Create state for the given publisher and validation lists.
    pub const fn new(
        publisher: P,
        subject: String,
        regions: Vec<String>,
        vocabulary: ConditionVocabulary,
    ) -> Self {
        Self {
            publisher,
            subject,
            regions,
            vocabulary,
            request_count: AtomicU64::new(0),
        }
    }

    /// Count a request and return its 1-based number.
    pub fn next_request_number(&self) -> u64 {
        self.request_count
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1)
    }

    /// Requests received so far, valid or not.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Check the observation's region and condition.
    ///
    /// # Errors
    ///
    /// Returns [`IngressError::InvalidRegion`] or
    /// [`IngressError::InvalidCondition`].
    pub fn validate(&self, event: &ObservationEvent) -> Result<(), IngressError> {
        if !self.regions.iter().any(|r| *r == event.region) {
            return Err(IngressError::InvalidRegion(event.region.clone()));
        }
        if !self.vocabulary.contains(&event.condition) {
            return Err(IngressError::InvalidCondition(event.condition.clone()));
        }
        Ok(())
    }
}
