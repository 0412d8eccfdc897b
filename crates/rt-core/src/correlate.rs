//! Lagged cross-signal correlation.
//!
//! The engine scans a bounded range of day offsets to find the time shift
//! that maximizes the Pearson correlation between two daily signals, with
//! "xs leads ys" semantics. It only scores single hops; composing a
//! multi-hop causal story (deployment -> failures -> churn) is the
//! orchestrator's job.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rt_math::lagged_pearson;

use crate::config::CorrelationConfig;

/// Strength bucket of an absolute correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationStrength {
    Negligible,
    Weak,
    Moderate,
    Strong,
}

/// Best correlation found in a lag search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LagCorrelation {
    /// Day offset at which `r` was observed (xs leads ys by this many days).
    pub lag: usize,
    pub r: f64,
    pub strength: CorrelationStrength,
}

/// One hop of a multi-signal correlation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationHop {
    pub from: String,
    pub to: String,
    pub correlation: LagCorrelation,
}

/// Bounded lag search over pairs of daily signals.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    config: CorrelationConfig,
}

impl CorrelationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CorrelationConfig) -> Self {
        CorrelationEngine { config }
    }

    /// Evaluate lags `0..=max_lag` in ascending order and keep the one
    /// with the largest `|r|`; ties favor the smaller lag.
    pub fn best_lag_correlation(&self, xs: &[f64], ys: &[f64], max_lag: usize) -> LagCorrelation {
        let mut best_lag = 0;
        let mut best_r = lagged_pearson(xs, ys, 0);
        for lag in 1..=max_lag {
            let r = lagged_pearson(xs, ys, lag);
            if r.abs() > best_r.abs() {
                best_lag = lag;
                best_r = r;
            }
        }
        debug!(lag = best_lag, r = best_r, "lag search complete");
        LagCorrelation {
            lag: best_lag,
            r: best_r,
            strength: self.strength(best_r),
        }
    }

    /// Lag-search each adjacent pair of named signals independently.
    pub fn chain(&self, signals: &[(&str, Vec<f64>)]) -> Vec<CorrelationHop> {
        signals
            .windows(2)
            .map(|pair| {
                let (from_name, from_series) = &pair[0];
                let (to_name, to_series) = &pair[1];
                CorrelationHop {
                    from: (*from_name).to_string(),
                    to: (*to_name).to_string(),
                    correlation: self.best_lag_correlation(
                        from_series,
                        to_series,
                        self.config.max_lag_days,
                    ),
                }
            })
            .collect()
    }

    fn strength(&self, r: f64) -> CorrelationStrength {
        let abs = r.abs();
        if abs >= self.config.strong {
            CorrelationStrength::Strong
        } else if abs >= self.config.moderate {
            CorrelationStrength::Moderate
        } else if abs >= self.config.weak {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::Negligible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_true_lag() {
        // ys is xs shifted right by 2 days plus a flat tail.
        let xs = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let ys = vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let engine = CorrelationEngine::new();
        let best = engine.best_lag_correlation(&xs, &ys, 7);
        assert_eq!(best.lag, 2);
        assert!(best.r > 0.9);
        assert_eq!(best.strength, CorrelationStrength::Strong);
    }

    #[test]
    fn ties_favor_the_smaller_lag() {
        // Flat series: every lag yields r == 0; lag 0 must win.
        let xs = vec![1.0, 1.0, 1.0, 1.0, 1.0];
        let ys = vec![2.0, 2.0, 2.0, 2.0, 2.0];
        let best = CorrelationEngine::new().best_lag_correlation(&xs, &ys, 4);
        assert_eq!(best.lag, 0);
        assert_eq!(best.r, 0.0);
        assert_eq!(best.strength, CorrelationStrength::Negligible);
    }

    #[test]
    fn negative_correlation_counts_by_magnitude() {
        let xs = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        let best = CorrelationEngine::new().best_lag_correlation(&xs, &ys, 3);
        assert_eq!(best.lag, 0);
        assert!(best.r < -0.99);
        assert_eq!(best.strength, CorrelationStrength::Strong);
    }

    #[test]
    fn strength_buckets_are_monotone() {
        let engine = CorrelationEngine::new();
        assert_eq!(engine.strength(0.85), CorrelationStrength::Strong);
        assert_eq!(engine.strength(-0.5), CorrelationStrength::Moderate);
        assert_eq!(engine.strength(0.25), CorrelationStrength::Weak);
        assert_eq!(engine.strength(0.1), CorrelationStrength::Negligible);
    }

    #[test]
    fn chain_scores_adjacent_pairs() {
        let a = vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let b = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let c = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let hops = CorrelationEngine::new().chain(&[
            ("deployments", a),
            ("failed_transactions", b),
            ("churned_value", c),
        ]);
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].from, "deployments");
        assert_eq!(hops[0].to, "failed_transactions");
        assert_eq!(hops[0].correlation.lag, 1);
        assert_eq!(hops[1].from, "failed_transactions");
        assert_eq!(hops[1].to, "churned_value");
    }

    #[test]
    fn short_series_degrade_to_zero() {
        let best = CorrelationEngine::new().best_lag_correlation(&[1.0, 2.0], &[2.0, 1.0], 5);
        assert_eq!(best.r, 0.0);
        assert_eq!(best.strength, CorrelationStrength::Negligible);
    }
}
