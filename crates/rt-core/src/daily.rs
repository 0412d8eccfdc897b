//! Calendar-day aggregation of observation series.
//!
//! Every metric entering the pipeline is a list of `(timestamp, is_anomalous)`
//! observations; the first step is always grouping them into UTC calendar-day
//! buckets. Buckets are derived data with the lifetime of one pipeline
//! invocation and are never mutated after construction.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Aggregated counts for one metric over one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DailyBucket {
    pub day: NaiveDate,
    pub total: u64,
    pub anomalous: u64,
}

impl DailyBucket {
    /// Fraction of anomalous observations; 0.0 for an empty bucket.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.anomalous as f64 / self.total as f64
    }
}

/// One entry of a daily rate series, carrying the per-day drift factor
/// relative to a baseline rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyRate {
    pub day: NaiveDate,
    pub total: u64,
    pub anomalous: u64,
    pub rate: f64,
    /// `rate / baseline_rate`; 0.0 when the baseline is 0.
    pub drift_factor: f64,
}

/// Group observations into per-day buckets, sorted by day.
pub fn bucket_by_day(observations: &[(DateTime<Utc>, bool)]) -> Vec<DailyBucket> {
    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for (ts, anomalous) in observations {
        let entry = days.entry(ts.date_naive()).or_insert((0, 0));
        entry.0 += 1;
        if *anomalous {
            entry.1 += 1;
        }
    }
    days.into_iter()
        .map(|(day, (total, anomalous))| DailyBucket {
            day,
            total,
            anomalous,
        })
        .collect()
}

/// Expand buckets into a rate series with per-day drift factors against
/// `baseline_rate`.
pub fn rate_series(buckets: &[DailyBucket], baseline_rate: f64) -> Vec<DailyRate> {
    buckets
        .iter()
        .map(|b| {
            let rate = b.rate();
            let drift_factor = if baseline_rate > 0.0 {
                rate / baseline_rate
            } else {
                0.0
            };
            DailyRate {
                day: b.day,
                total: b.total,
                anomalous: b.anomalous,
                rate,
                drift_factor,
            }
        })
        .collect()
}
