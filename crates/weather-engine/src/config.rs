//! Engine configuration.

use std::time::Duration;

use weather_store::KeySchema;
use weather_types::ConditionVocabulary;

/// Construction-time settings for an [`AggregationEngine`].
///
/// [`AggregationEngine`]: crate::AggregationEngine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Closed set of labels eligible for most/least common ranking.
    pub vocabulary: ConditionVocabulary,
    /// Key composition for every metric.
    pub keys: KeySchema,
    /// Pause inserted between the transactional sum/count increment and
    /// the average recompute. `None` in production; tests set it to hold
    /// the inconsistency window open.
    pub recompute_delay: Option<Duration>,
}

impl EngineConfig {
    /// Configuration with the given vocabulary and default keys.
    pub fn new(vocabulary: ConditionVocabulary) -> Self {
        Self {
            vocabulary,
            ..Self::default()
        }
    }

    /// Use `keys` for key composition.
    #[must_use]
    pub fn with_keys(mut self, keys: KeySchema) -> Self {
        self.keys = keys;
        self
    }

    /// Hold the average recompute back by `delay` after each transaction.
    #[must_use]
    pub const fn with_recompute_delay(mut self, delay: Duration) -> Self {
        self.recompute_delay = Some(delay);
        self
    }
}
