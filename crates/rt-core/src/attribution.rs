//! Event attribution: how confident are we that a candidate triggering
//! event caused the observed metric shift?
//!
//! The confidence formula is a deliberate heuristic, not a statistical
//! test. It rewards tight temporal alignment between the event and the
//! spike onset plus a real increase in the anomaly rate, and penalizes a
//! spike that began *before* the candidate event (an inversion: the event
//! cannot have caused what preceded it). The break points and coefficients
//! are fixed for output compatibility; they live in
//! [`AttributionConfig`](crate::config::AttributionConfig) as tunable
//! parameters with exactly those defaults.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rt_common::EventRecord;

use crate::config::{AttributionConfig, DriftConfig};
use crate::drift::DriftDetector;

/// Qualitative classification of an attribution confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributionClass {
    StrongCausalLink,
    ModerateCorrelation,
    WeakSignal,
    InverseCorrelation,
}

/// Scored attribution of one candidate event. Carries the formula inputs
/// (`temporal_score`, `impact_delta`, `onset_day`, before/after rates) so
/// the confidence is auditable, and identifies the event it scored
/// (`version`, `occurred_at`) so the artifact is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttributionScore {
    pub version: String,
    pub occurred_at: DateTime<Utc>,
    /// In [-1, 1]; clamped regardless of how extreme the inputs are.
    pub confidence: f64,
    pub classification: AttributionClass,
    pub temporal_score: f64,
    pub impact_delta: f64,
    pub rate_before: f64,
    pub rate_after: f64,
    pub onset_day: Option<NaiveDate>,
}

/// Scores candidate triggering events against a metric series.
#[derive(Debug, Clone, Default)]
pub struct EventAttributionScorer {
    config: AttributionConfig,
    drift: DriftConfig,
}

impl EventAttributionScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AttributionConfig, drift: DriftConfig) -> Self {
        EventAttributionScorer { config, drift }
    }

    /// Score one candidate event against the full metric series.
    pub fn score(
        &self,
        observations: &[(DateTime<Utc>, bool)],
        event: &EventRecord,
    ) -> AttributionScore {
        let (rate_before, rate_after) = partition_rates(observations, event.timestamp);

        // Locate the spike onset with the event day as the baseline split.
        let event_day = event.timestamp.date_naive();
        let detector = DriftDetector::with_config(self.drift.clone());
        let drift = detector.detect(observations, event_day);
        let onset_day = DriftDetector::find_onset(&drift.daily_series, self.drift.onset_threshold);

        let temporal_score = self.temporal_score(onset_day, event_day);
        let impact_delta = rate_after - rate_before;
        let confidence = (temporal_score * self.config.temporal_weight
            + (impact_delta * self.config.impact_scale).min(self.config.impact_cap))
        .clamp(-1.0, 1.0);

        let classification = if confidence >= self.config.strong_threshold {
            AttributionClass::StrongCausalLink
        } else if confidence >= self.config.moderate_threshold {
            AttributionClass::ModerateCorrelation
        } else if confidence >= 0.0 {
            AttributionClass::WeakSignal
        } else {
            AttributionClass::InverseCorrelation
        };

        debug!(
            version = %event.version_label,
            confidence,
            temporal_score,
            impact_delta,
            "scored candidate event"
        );

        AttributionScore {
            version: event.version_label.clone(),
            occurred_at: event.timestamp,
            confidence,
            classification,
            temporal_score,
            impact_delta,
            rate_before,
            rate_after,
            onset_day,
        }
    }

    /// Temporal-alignment step function over `onset_day - event_day`.
    fn temporal_score(&self, onset_day: Option<NaiveDate>, event_day: NaiveDate) -> f64 {
        let Some(onset) = onset_day else {
            return 0.0;
        };
        let delta = onset.signed_duration_since(event_day).num_days();
        if delta < 0 {
            // Degradation began before the candidate event.
            -0.5
        } else if delta <= self.config.tight_alignment_days {
            1.0
        } else if delta <= self.config.loose_alignment_days {
            0.7
        } else {
            0.0
        }
    }
}

/// Anomaly fractions of the observations strictly before and at-or-after
/// `split`; 0.0 for an empty partition.
fn partition_rates(observations: &[(DateTime<Utc>, bool)], split: DateTime<Utc>) -> (f64, f64) {
    let mut before = (0u64, 0u64);
    let mut after = (0u64, 0u64);
    for (ts, anomalous) in observations {
        let side = if *ts < split { &mut before } else { &mut after };
        side.0 += 1;
        if *anomalous {
            side.1 += 1;
        }
    }
    let rate = |(total, anomalous): (u64, u64)| {
        if total == 0 {
            0.0
        } else {
            anomalous as f64 / total as f64
        }
    };
    (rate(before), rate(after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rt_common::EventKind;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn deployment(day: u32) -> EventRecord {
        EventRecord {
            entity_id: "acme".into(),
            timestamp: ts(day, 0),
            version_label: format!("v2.{day}.0"),
            kind: EventKind::Deployment,
        }
    }

    /// Daily observations: `per_day[i]` is `(total, anomalous)` on day i+1.
    fn series(per_day: &[(u32, u32)]) -> Vec<(DateTime<Utc>, bool)> {
        let mut out = Vec::new();
        for (i, (total, anomalous)) in per_day.iter().enumerate() {
            for j in 0..*total {
                out.push((ts(i as u32 + 1, 12), j < *anomalous));
            }
        }
        out
    }

    #[test]
    fn aligned_spike_is_strong_causal_link() {
        // Quiet 2% baseline for 5 days, deployment on day 6, spike from day 6.
        let obs = series(&[(50, 1), (50, 1), (50, 1), (50, 1), (50, 1), (50, 20), (50, 20), (50, 20)]);
        let score = EventAttributionScorer::new().score(&obs, &deployment(6));

        assert_eq!(score.onset_day, Some(NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()));
        assert_eq!(score.temporal_score, 1.0);
        assert!(score.impact_delta > 0.3);
        // 1.0 * 0.6 + capped impact 0.4 = 1.0
        assert!((score.confidence - 1.0).abs() < 1e-9);
        assert_eq!(score.classification, AttributionClass::StrongCausalLink);
        assert!((score.rate_before - 0.02).abs() < 1e-9);
        assert!((score.rate_after - 0.4).abs() < 1e-9);
    }

    #[test]
    fn onset_before_event_penalizes_confidence() {
        // Spike begins on day 5, deployment only lands on day 6; the rate
        // keeps rising afterwards, so the capped impact term pulls the
        // confidence back up to a weak signal at best.
        let obs = series(&[(50, 1), (50, 1), (50, 1), (50, 1), (50, 20), (50, 20), (50, 20)]);
        let score = EventAttributionScorer::new().score(&obs, &deployment(6));

        assert_eq!(score.temporal_score, -0.5);
        // -0.5 * 0.6 + capped impact 0.4 = 0.1
        assert!((score.confidence - 0.1).abs() < 1e-9);
        assert_eq!(score.classification, AttributionClass::WeakSignal);
    }

    #[test]
    fn onset_before_event_with_subsiding_burst_is_inverse() {
        // Burst on days 5-6 already over by the time the day-6 deployment
        // lands; the small post-event rate gain cannot offset the penalty.
        let obs = series(&[(50, 1), (50, 1), (50, 1), (50, 1), (50, 20), (50, 20), (50, 1), (50, 1)]);
        let score = EventAttributionScorer::new().score(&obs, &deployment(6));

        assert_eq!(score.temporal_score, -0.5);
        assert!(score.confidence < 0.0);
        assert_eq!(score.classification, AttributionClass::InverseCorrelation);
    }

    #[test]
    fn no_onset_scores_zero_temporal() {
        let obs = series(&[(50, 1), (50, 1), (50, 1), (50, 1), (50, 1), (50, 1)]);
        let score = EventAttributionScorer::new().score(&obs, &deployment(3));
        assert_eq!(score.onset_day, None);
        assert_eq!(score.temporal_score, 0.0);
        assert_eq!(score.classification, AttributionClass::WeakSignal);
    }

    #[test]
    fn loose_alignment_scores_partial_credit() {
        // Deployment day 4, spike from day 6 (delta = 2).
        let obs = series(&[(50, 1), (50, 1), (50, 1), (50, 1), (50, 1), (50, 20), (50, 20)]);
        let score = EventAttributionScorer::new().score(&obs, &deployment(4));
        assert_eq!(score.temporal_score, 0.7);
        // 0.7 * 0.6 + 0.4 = 0.82
        assert!((score.confidence - 0.82).abs() < 1e-9);
        assert_eq!(score.classification, AttributionClass::StrongCausalLink);
    }

    #[test]
    fn confidence_is_clamped_for_extreme_inputs() {
        // rate_after - rate_before can be at most 1; the impact term is
        // capped at 0.4 anyway, so confidence never exceeds 1.
        let obs = series(&[(50, 0), (50, 0), (50, 50), (50, 50)]);
        let score = EventAttributionScorer::new().score(&obs, &deployment(3));
        assert!((-1.0..=1.0).contains(&score.confidence));
    }

    #[test]
    fn rate_drop_contributes_negatively() {
        // A fix deployment: anomalies stop after it.
        let obs = series(&[(50, 20), (50, 20), (50, 1), (50, 1)]);
        let score = EventAttributionScorer::new().score(&obs, &deployment(3));
        assert!(score.impact_delta < 0.0);
        assert!(score.confidence < 0.0);
        assert_eq!(score.classification, AttributionClass::InverseCorrelation);
    }
}
