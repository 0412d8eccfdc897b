//! Composite risk scoring.
//!
//! Normalizes and weights three signals into one bounded score: the
//! billing anomaly rate, the financial loss ratio, and the recency of the
//! most recent candidate event. Every component exposes its raw value,
//! normalization, weight, and weighted contribution, so the score is an
//! auditable sum rather than a black box.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rt_common::{EventRecord, RecordSet};

use crate::config::RiskConfig;

/// Seconds per day, for fractional day arithmetic.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Severity bucket of a composite risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

/// Audit record for one risk component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskComponent {
    pub raw: f64,
    pub normalized: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Composite risk score with its full component breakdown.
///
/// Invariant: `score` equals the sum of component contributions, and the
/// component weights sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskScore {
    /// In [0, 1].
    pub score: f64,
    pub category: RiskCategory,
    pub components: BTreeMap<String, RiskComponent>,
}

/// Weighted normalized combination of anomaly rate, loss ratio, and event
/// recency.
#[derive(Debug, Clone, Default)]
pub struct CompositeRiskScorer {
    config: RiskConfig,
}

impl CompositeRiskScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RiskConfig) -> Self {
        CompositeRiskScorer { config }
    }

    /// Score one entity's snapshot as of `now` (the analysis instant,
    /// always passed in explicitly).
    pub fn score(
        &self,
        records: &RecordSet,
        last_event: Option<&EventRecord>,
        now: DateTime<Utc>,
    ) -> RiskScore {
        let total = records.billing.len();
        let anomalous = records.billing.iter().filter(|r| r.is_anomalous()).count();
        let anomaly_rate = if total == 0 {
            0.0
        } else {
            anomalous as f64 / total as f64
        };

        let expected: f64 = records.billing.iter().map(|r| r.expected_amount).sum();
        let loss: f64 = records.billing.iter().map(|r| r.loss()).sum();
        let loss_ratio = if expected > 0.0 { loss / expected } else { 0.0 };

        // A future-dated event counts as zero days old, keeping the
        // factor in [0, 1].
        let recency_factor = match last_event {
            None => 0.0,
            Some(event) => {
                let days_since = ((now - event.timestamp).num_seconds() as f64 / SECONDS_PER_DAY)
                    .max(0.0);
                (-days_since / self.config.recency_decay_days).exp().clamp(0.0, 1.0)
            }
        };

        let mut components = BTreeMap::new();
        let mut score = 0.0;
        for (name, raw, normalized, weight) in [
            (
                "anomaly_rate",
                anomaly_rate,
                (anomaly_rate * self.config.anomaly_scale).min(1.0),
                self.config.anomaly_weight,
            ),
            (
                "loss_ratio",
                loss_ratio,
                (loss_ratio * self.config.loss_scale).min(1.0),
                self.config.loss_weight,
            ),
            (
                "event_recency",
                recency_factor,
                recency_factor,
                self.config.recency_weight,
            ),
        ] {
            let contribution = normalized * weight;
            score += contribution;
            components.insert(
                name.to_string(),
                RiskComponent {
                    raw,
                    normalized,
                    weight,
                    contribution,
                },
            );
        }

        let category = if score > self.config.critical_threshold {
            RiskCategory::Critical
        } else if score > self.config.high_threshold {
            RiskCategory::High
        } else if score > self.config.medium_threshold {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        };

        debug!(score, ?category, "composite risk scored");

        RiskScore {
            score,
            category,
            components,
        }
    }
}
