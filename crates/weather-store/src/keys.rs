//! Key composition for every metric the engine maintains.
//!
//! Keys follow `<namespace>:<dimension>:<suffix>`. Dashboards read these
//! names directly, so they are part of the external contract.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `weather:{region}:condition:{condition}` | Integer | Per-region condition counter |
//! | `clima:{condition}:count` | Integer | Global condition histogram |
//! | `temperatura:{region}:{value}` | Integer | Per-region temperature value histogram |
//! | `municipality:{region}:count` | Integer | Observations seen for the region |
//! | `municipality:{region}:{reading}_sum` | Integer | Running total of a reading |
//! | `municipality:{region}:{reading}` | Integer | Last observed reading |
//! | `municipality:{region}:{metric}:sum` | Integer | Average numerator (transactional) |
//! | `municipality:{region}:{metric}:count` | Integer | Average denominator (transactional) |
//! | `municipality:{region}:{metric}:avg` | String | Average, two decimals |
//! | `metrics:{metric}:{max,min}` | Integer | Global extrema |
//!
//! `{reading}` is `temperature` or `humidity`. `{metric}` is the segment
//! the existing dashboards query for averages and extrema: `temperature`
//! or `humedad`.
//! | `municipality:{region}:weather:{most,least}_common` | String | Condition ranking |

use weather_types::Reading;

/// Which side of an extremum a key tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Running maximum.
    Max,
    /// Running minimum.
    Min,
}

impl Bound {
    /// Key segment for this bound.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

/// Which end of the condition ranking a key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    /// The label with the highest count.
    MostCommon,
    /// The label with the lowest count.
    LeastCommon,
}

impl Rank {
    /// Key segment for this rank.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MostCommon => "most_common",
            Self::LeastCommon => "least_common",
        }
    }
}

/// Key segment for the average and extremum keys of `reading`.
pub const fn metric_segment(reading: Reading) -> &'static str {
    match reading {
        Reading::Temperature => "temperature",
        Reading::Humidity => "humedad",
    }
}

/// Builds store keys, optionally under a deployment prefix.
///
/// With a prefix `p`, every key becomes `p:<key>`. Production runs without
/// a prefix so dashboards keep reading the bare names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySchema {
    prefix: Option<String>,
}

impl KeySchema {
    /// Schema producing bare key names.
    pub const fn new() -> Self {
        Self { prefix: None }
    }

    /// Schema namespacing every key under `prefix`. A blank prefix is ignored.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim().trim_end_matches(':').to_owned();
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    fn compose(&self, key: String) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key,
        }
    }

    /// `weather:{region}:condition:{condition}`
    pub fn condition_count(&self, region: &str, condition: &str) -> String {
        self.compose(format!("weather:{region}:condition:{condition}"))
    }

    /// `clima:{condition}:count`
    pub fn condition_total(&self, condition: &str) -> String {
        self.compose(format!("clima:{condition}:count"))
    }

    /// `temperatura:{region}:{value}`
    pub fn temperature_value(&self, region: &str, value: i64) -> String {
        self.compose(format!("temperatura:{region}:{value}"))
    }

    /// `municipality:{region}:count`
    pub fn region_count(&self, region: &str) -> String {
        self.compose(format!("municipality:{region}:count"))
    }

    /// `municipality:{region}:{reading}_sum`
    pub fn region_sum(&self, region: &str, reading: Reading) -> String {
        self.compose(format!("municipality:{region}:{reading}_sum"))
    }

    /// `municipality:{region}:{reading}`
    pub fn latest(&self, region: &str, reading: Reading) -> String {
        self.compose(format!("municipality:{region}:{reading}"))
    }

    /// `municipality:{region}:{metric}:sum`
    pub fn average_sum(&self, region: &str, reading: Reading) -> String {
        self.compose(format!(
            "municipality:{region}:{}:sum",
            metric_segment(reading)
        ))
    }

    /// `municipality:{region}:{metric}:count`
    pub fn average_count(&self, region: &str, reading: Reading) -> String {
        self.compose(format!(
            "municipality:{region}:{}:count",
            metric_segment(reading)
        ))
    }

    /// `municipality:{region}:{metric}:avg`
    pub fn average(&self, region: &str, reading: Reading) -> String {
        self.compose(format!(
            "municipality:{region}:{}:avg",
            metric_segment(reading)
        ))
    }

    /// `metrics:{metric}:{bound}`
    pub fn extremum(&self, reading: Reading, bound: Bound) -> String {
        self.compose(format!(
            "metrics:{}:{}",
            metric_segment(reading),
            bound.as_str()
        ))
    }

    /// `municipality:{region}:weather:{rank}`
    pub fn ranking(&self, region: &str, rank: Rank) -> String {
        self.compose(format!("municipality:{region}:weather:{}", rank.as_str()))
    }
}
