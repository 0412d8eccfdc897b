//! Pipeline configuration.
//!
//! Every numeric constant in the pipeline formulas lives here with its
//! documented default, so the formulas stay testable against alternate
//! parameterizations without touching component code. The defaults are
//! reference-vector-compatible: changing them changes verdicts.
//!
//! `validate()` performs semantic checks (weights summing to 1, positive
//! windows, ordered thresholds) and returns `Error::InvalidConfig` naming
//! the component on failure.

use serde::{Deserialize, Serialize};

use rt_common::{Error, Result};

/// Tolerance when checking that risk weights sum to 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Drift detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Number of most recent observed days forming the "current" window.
    pub recent_window_days: usize,
    /// Drift factor above which a spike is declared.
    pub spike_threshold: f64,
    /// Per-day drift factor above which a day counts as the spike onset.
    pub onset_threshold: f64,
    /// z-score above which the drift is a high signal.
    pub high_signal_z: f64,
    /// z-score above which the drift is moderate.
    pub moderate_z: f64,
    /// Stddev floor used when the baseline has at most one day, keeping
    /// the z-score defined.
    pub min_std_dev: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        DriftConfig {
            recent_window_days: 3,
            spike_threshold: 3.0,
            onset_threshold: 2.0,
            high_signal_z: 3.0,
            moderate_z: 2.0,
            min_std_dev: 1e-4,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<()> {
        if self.recent_window_days == 0 {
            return invalid("drift", "recent_window_days must be positive");
        }
        if self.spike_threshold <= 0.0 || self.onset_threshold <= 0.0 {
            return invalid("drift", "spike and onset thresholds must be positive");
        }
        if self.high_signal_z <= self.moderate_z {
            return invalid("drift", "high_signal_z must exceed moderate_z");
        }
        if self.min_std_dev <= 0.0 {
            return invalid("drift", "min_std_dev must be positive");
        }
        Ok(())
    }
}

/// Lag-search parameters for the correlation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Largest day offset evaluated during lag search.
    pub max_lag_days: usize,
    /// |r| at or above which a correlation is strong.
    pub strong: f64,
    /// |r| at or above which a correlation is moderate.
    pub moderate: f64,
    /// |r| at or above which a correlation is weak (below: negligible).
    pub weak: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        CorrelationConfig {
            max_lag_days: 7,
            strong: 0.7,
            moderate: 0.4,
            weak: 0.2,
        }
    }
}

impl CorrelationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.weak < self.moderate && self.moderate < self.strong) {
            return invalid("correlation", "strength thresholds must be ordered");
        }
        if self.strong > 1.0 || self.weak <= 0.0 {
            return invalid("correlation", "strength thresholds must lie in (0, 1]");
        }
        Ok(())
    }
}

/// Event attribution parameters.
///
/// The temporal step function and the impact scaling are deliberate
/// heuristics with no statistical derivation; they are carried as tunable
/// parameters but the defaults must be preserved for output compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Weight of the temporal-alignment score in the confidence formula.
    pub temporal_weight: f64,
    /// Multiplier applied to the before/after rate delta.
    pub impact_scale: f64,
    /// Cap on the scaled impact contribution.
    pub impact_cap: f64,
    /// Confidence at or above which the link is classified strong.
    pub strong_threshold: f64,
    /// Confidence at or above which the link is a moderate correlation.
    pub moderate_threshold: f64,
    /// Onset within this many days after the event scores 1.0.
    pub tight_alignment_days: i64,
    /// Onset within this many days after the event scores 0.7.
    pub loose_alignment_days: i64,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        AttributionConfig {
            temporal_weight: 0.6,
            impact_scale: 5.0,
            impact_cap: 0.4,
            strong_threshold: 0.7,
            moderate_threshold: 0.3,
            tight_alignment_days: 1,
            loose_alignment_days: 3,
        }
    }
}

impl AttributionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.moderate_threshold >= self.strong_threshold {
            return invalid("attribution", "moderate_threshold must be below strong_threshold");
        }
        if self.tight_alignment_days < 0 || self.loose_alignment_days <= self.tight_alignment_days {
            return invalid("attribution", "alignment windows must be ordered and non-negative");
        }
        if self.temporal_weight <= 0.0 || self.impact_scale <= 0.0 {
            return invalid("attribution", "temporal_weight and impact_scale must be positive");
        }
        Ok(())
    }
}

/// Composite risk scoring parameters. Weights must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub anomaly_weight: f64,
    pub loss_weight: f64,
    pub recency_weight: f64,
    /// Anomaly rate is scaled by this factor before capping at 1.
    pub anomaly_scale: f64,
    /// Loss ratio is scaled by this factor before capping at 1.
    pub loss_scale: f64,
    /// e-folding time of the event-recency factor, in days.
    pub recency_decay_days: f64,
    pub critical_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            anomaly_weight: 0.4,
            loss_weight: 0.35,
            recency_weight: 0.25,
            anomaly_scale: 2.0,
            loss_scale: 10.0,
            recency_decay_days: 7.0,
            critical_threshold: 0.8,
            high_threshold: 0.6,
            medium_threshold: 0.3,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        let sum = self.anomaly_weight + self.loss_weight + self.recency_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return invalid("risk", format!("weights must sum to 1, got {sum}"));
        }
        if self.anomaly_weight < 0.0 || self.loss_weight < 0.0 || self.recency_weight < 0.0 {
            return invalid("risk", "weights must be non-negative");
        }
        if self.recency_decay_days <= 0.0 {
            return invalid("risk", "recency_decay_days must be positive");
        }
        if !(self.medium_threshold < self.high_threshold
            && self.high_threshold < self.critical_threshold)
        {
            return invalid("risk", "category thresholds must be ordered");
        }
        Ok(())
    }
}

/// Impact projection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub monthly_days: f64,
    pub annual_days: f64,
    /// Churned recurring value is amplified by this ripple factor in the
    /// conservative projection model.
    pub churn_ripple_multiplier: f64,
    /// Trailing sub-window used to derive the average daily loss.
    pub trailing_days: i64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        ImpactConfig {
            monthly_days: 30.0,
            annual_days: 365.0,
            churn_ripple_multiplier: 1.5,
            trailing_days: 7,
        }
    }
}

impl ImpactConfig {
    pub fn validate(&self) -> Result<()> {
        if self.monthly_days <= 0.0 || self.annual_days <= 0.0 {
            return invalid("impact", "projection horizons must be positive");
        }
        if self.trailing_days <= 0 {
            return invalid("impact", "trailing_days must be positive");
        }
        Ok(())
    }
}

/// Top-level pipeline configuration composed of each component's config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationConfig {
    pub drift: DriftConfig,
    pub correlation: CorrelationConfig,
    pub attribution: AttributionConfig,
    pub risk: RiskConfig,
    pub impact: ImpactConfig,
    /// Culprit confidence above which the verdict confirms a causal link.
    pub confirm_threshold: f64,
    /// Baseline/recent boundary offset (days before the last observed day)
    /// used when the entity has no deployment to anchor on.
    pub baseline_boundary_days: i64,
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        InvestigationConfig {
            drift: DriftConfig::default(),
            correlation: CorrelationConfig::default(),
            attribution: AttributionConfig::default(),
            risk: RiskConfig::default(),
            impact: ImpactConfig::default(),
            confirm_threshold: 0.5,
            baseline_boundary_days: 3,
        }
    }
}

impl InvestigationConfig {
    pub fn validate(&self) -> Result<()> {
        self.drift.validate()?;
        self.correlation.validate()?;
        self.attribution.validate()?;
        self.risk.validate()?;
        self.impact.validate()?;
        if !(-1.0..=1.0).contains(&self.confirm_threshold) {
            return invalid("investigation", "confirm_threshold must lie in [-1, 1]");
        }
        if self.baseline_boundary_days <= 0 {
            return invalid("investigation", "baseline_boundary_days must be positive");
        }
        Ok(())
    }
}

fn invalid(component: &'static str, message: impl Into<String>) -> Result<()> {
    Err(Error::InvalidConfig {
        component,
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(InvestigationConfig::default().validate().is_ok());
    }

    #[test]
    fn default_constants_match_reference() {
        let cfg = InvestigationConfig::default();
        assert_eq!(cfg.drift.recent_window_days, 3);
        assert_eq!(cfg.drift.spike_threshold, 3.0);
        assert_eq!(cfg.risk.anomaly_weight, 0.4);
        assert_eq!(cfg.risk.loss_weight, 0.35);
        assert_eq!(cfg.risk.recency_weight, 0.25);
        assert_eq!(cfg.risk.recency_decay_days, 7.0);
        assert_eq!(cfg.attribution.temporal_weight, 0.6);
        assert_eq!(cfg.attribution.impact_cap, 0.4);
        assert_eq!(cfg.impact.churn_ripple_multiplier, 1.5);
        assert_eq!(cfg.confirm_threshold, 0.5);
    }

    #[test]
    fn bad_risk_weights_rejected() {
        let cfg = RiskConfig {
            anomaly_weight: 0.5,
            ..RiskConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("risk"));
    }

    #[test]
    fn unordered_thresholds_rejected() {
        let cfg = DriftConfig {
            high_signal_z: 1.0,
            ..DriftConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = CorrelationConfig {
            weak: 0.9,
            ..CorrelationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let cfg = DriftConfig {
            recent_window_days: 0,
            ..DriftConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: DriftConfig = serde_json::from_str(r#"{"spike_threshold": 2.5}"#).unwrap();
        assert_eq!(cfg.spike_threshold, 2.5);
        assert_eq!(cfg.recent_window_days, 3);
    }
}
