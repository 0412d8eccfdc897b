//! Baseline/current drift detection over a daily anomaly-rate series.
//!
//! The detector splits the observed days at a caller-supplied boundary:
//! days strictly before it form the baseline, and the most recent
//! `recent_window_days` observed days (by sort order, not wall clock) form
//! the current window. The drift factor is the ratio of the two mean rates.
//!
//! Zero baseline days is a deliberate conservative case: without a
//! baseline no drift claim is made, so the factor is 0 and no spike is
//! declared, regardless of how bad the recent window looks.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rt_math::{mean, sample_stddev, welch_t_test, z_score, WelchResult};

use crate::config::DriftConfig;
use crate::daily::{bucket_by_day, rate_series, DailyRate};

/// Significance tier of a drift z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignificanceTier {
    Noise,
    Moderate,
    HighSignal,
}

/// Welch's t-test of recent vs baseline daily rates, carried in the drift
/// result as confirmatory evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WelchSummary {
    pub t: f64,
    pub significant: bool,
}

impl From<WelchResult> for WelchSummary {
    fn from(r: WelchResult) -> Self {
        WelchSummary {
            t: r.t,
            significant: r.significant,
        }
    }
}

/// Outcome of one drift detection run. Total field set: absent signals are
/// explicit zeros, never missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DriftResult {
    pub baseline_rate: f64,
    pub current_rate: f64,
    /// `current_rate / baseline_rate`; 0.0 when the baseline is 0.
    pub drift_factor: f64,
    /// Sample stddev of baseline daily rates (floored at the configured
    /// minimum when the baseline has at most one day).
    pub std_dev: f64,
    pub z_score: f64,
    pub significance: SignificanceTier,
    pub is_spike: bool,
    /// The spike threshold the factor was compared against.
    pub threshold: f64,
    pub daily_series: Vec<DailyRate>,
    pub baseline_days: usize,
    pub recent_days: usize,
    pub welch: WelchSummary,
}

/// Splits a metric's daily series into baseline and recent windows and
/// scores the deviation.
#[derive(Debug, Clone, Default)]
pub struct DriftDetector {
    config: DriftConfig,
}

impl DriftDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DriftConfig) -> Self {
        DriftDetector { config }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Detect drift in a `(timestamp, is_anomalous)` series split at
    /// `boundary` (baseline is strictly before it).
    pub fn detect(
        &self,
        observations: &[(DateTime<Utc>, bool)],
        boundary: NaiveDate,
    ) -> DriftResult {
        let buckets = bucket_by_day(observations);

        let baseline_rates: Vec<f64> = buckets
            .iter()
            .filter(|b| b.day < boundary)
            .map(|b| b.rate())
            .collect();
        let recent_start = buckets.len().saturating_sub(self.config.recent_window_days);
        let recent_rates: Vec<f64> = buckets[recent_start..].iter().map(|b| b.rate()).collect();

        let baseline_rate = mean(&baseline_rates);
        let current_rate = mean(&recent_rates);
        let drift_factor = if baseline_rate > 0.0 {
            current_rate / baseline_rate
        } else {
            0.0
        };

        let std_dev = if baseline_rates.len() <= 1 {
            self.config.min_std_dev
        } else {
            sample_stddev(&baseline_rates)
        };
        let z = z_score(current_rate, baseline_rate, std_dev);

        let significance = if z > self.config.high_signal_z {
            SignificanceTier::HighSignal
        } else if z > self.config.moderate_z {
            SignificanceTier::Moderate
        } else {
            SignificanceTier::Noise
        };

        // No baseline, no claim: drift_factor is already 0 then, so the
        // spike comparison stays false on its own.
        let is_spike = drift_factor > self.config.spike_threshold;

        debug!(
            baseline_rate,
            current_rate, drift_factor, z, is_spike, "drift detection complete"
        );

        DriftResult {
            baseline_rate,
            current_rate,
            drift_factor,
            std_dev,
            z_score: z,
            significance,
            is_spike,
            threshold: self.config.spike_threshold,
            daily_series: rate_series(&buckets, baseline_rate),
            baseline_days: baseline_rates.len(),
            recent_days: recent_rates.len(),
            welch: welch_t_test(&recent_rates, &baseline_rates).into(),
        }
    }

    /// First day whose per-day drift factor exceeds `onset_threshold`.
    ///
    /// Returns `None` when no day qualifies, including the zero-baseline
    /// case where every per-day drift factor is 0.
    pub fn find_onset(series: &[DailyRate], onset_threshold: f64) -> Option<NaiveDate> {
        series
            .iter()
            .find(|d| d.drift_factor > onset_threshold)
            .map(|d| d.day)
    }
}
