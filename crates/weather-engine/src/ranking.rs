//! Most and least common condition per region.
//!
//! Ranking only looks at labels in the configured vocabulary, read in
//! vocabulary order. A strictly greater (or strictly smaller) count is
//! needed to displace the current leader, so ties resolve to the label
//! that comes first in the vocabulary.

use tracing::warn;
use weather_store::{KeySchema, MetricStore, Rank, StoreError};
use weather_types::ConditionVocabulary;

/// Result of ranking one region's condition counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    /// Label with the highest count.
    pub most_common: String,
    /// Label with the lowest count.
    pub least_common: String,
}

/// Rank `(label, count)` pairs given in tie-break order.
///
/// Returns `None` for an empty input.
pub fn rank<'a, I>(counts: I) -> Option<Ranking>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut iter = counts.into_iter();
    let (first, first_count) = iter.next()?;
    let (mut most, mut most_count) = (first, first_count);
    let (mut least, mut least_count) = (first, first_count);

    for (label, count) in iter {
        if count > most_count {
            most = label;
            most_count = count;
        }
        if count < least_count {
            least = label;
            least_count = count;
        }
    }

    Some(Ranking {
        most_common: most.to_owned(),
        least_common: least.to_owned(),
    })
}

/// Read every vocabulary counter for `region`, rank them and write both
/// labels back.
///
/// Absent counters count as zero. If any counter cannot be read the
/// write-back is skipped so a ranking is never built from partial data.
///
/// # Errors
///
/// Returns the first [`StoreError`] from a counter read or a write-back.
pub async fn recompute<S: MetricStore>(
    store: &S,
    keys: &KeySchema,
    vocabulary: &ConditionVocabulary,
    region: &str,
) -> Result<Option<Ranking>, StoreError> {
    let mut counts: Vec<(&str, i64)> = Vec::with_capacity(vocabulary.len());
    for label in vocabulary.iter() {
        let key = keys.condition_count(region, label);
        match store.get_int(&key).await {
            Ok(count) => counts.push((label, count.unwrap_or(0))),
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read condition counter");
                return Err(e);
            }
        }
    }

    let Some(ranking) = rank(counts) else {
        return Ok(None);
    };

    store
        .set(&keys.ranking(region, Rank::MostCommon), &ranking.most_common)
        .await?;
    store
        .set(&keys.ranking(region, Rank::LeastCommon), &ranking.least_common)
        .await?;
    Ok(Some(ranking))
}
