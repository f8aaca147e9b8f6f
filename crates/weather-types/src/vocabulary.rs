//! The closed condition vocabulary used for per-region ranking.
//!
//! Ranking only ever considers labels in the vocabulary, in vocabulary
//! order. Labels outside it are still counted by the engine but can never
//! become the most or least common condition.

/// Condition labels accepted by the producer side, in ranking order.
pub const DEFAULT_CONDITIONS: [&str; 4] = ["sunny", "rainy", "cloudy", "foggy"];

/// Regions (municipalities) accepted by the ingress front door.
pub const DEFAULT_REGIONS: [&str; 4] = ["mixco", "guatemala", "amatitlan", "chinautla"];

/// Errors raised while building a [`ConditionVocabulary`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    /// No usable labels were supplied.
    #[error("condition vocabulary must contain at least one label")]
    Empty,
}

/// An ordered, duplicate-free list of condition labels.
///
/// Iteration order is significant: it is the tie-break order when two
/// labels share a count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionVocabulary {
    labels: Vec<String>,
}

impl ConditionVocabulary {
    /// Build a vocabulary from labels, keeping first occurrence order.
    ///
    /// Labels are trimmed; blank labels and repeats are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::Empty`] if no label survives.
    pub fn new<I, S>(labels: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() || kept.iter().any(|k| k == label) {
                continue;
            }
            kept.push(label.to_owned());
        }
        if kept.is_empty() {
            return Err(VocabularyError::Empty);
        }
        Ok(Self { labels: kept })
    }

    /// Parse a comma-separated list such as `sunny,rainy,cloudy`.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::Empty`] if the list holds no labels.
    pub fn parse_list(list: &str) -> Result<Self, VocabularyError> {
        Self::new(list.split(','))
    }

    /// Whether `label` is part of the vocabulary.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Iterate labels in ranking order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false`: construction rejects empty vocabularies.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for ConditionVocabulary {
    fn default() -> Self {
        Self {
            labels: DEFAULT_CONDITIONS.iter().map(|&l| l.to_owned()).collect(),
        }
    }
}
