//! Financial impact projection.
//!
//! Converts the observed loss into monthly and annualized projections
//! using a fixed multiplicative model, plus a conservative churn-ripple
//! estimate when churn data is available. Every modeling choice is
//! reported as a named assumption string in the output; the churn ripple
//! is never folded silently into the headline numbers.

use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use rt_common::BillingRecord;

use crate::config::ImpactConfig;

/// Projected financial impact with its stated assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImpactProjection {
    pub observed_loss: f64,
    pub avg_daily_loss: f64,
    pub monthly_projection: f64,
    pub annualized_projection: f64,
    /// Conservative churn-ripple estimate; `None` when no churn data was
    /// available.
    pub churn_ripple: Option<f64>,
    pub assumptions: Vec<String>,
}

/// Fixed multiplicative loss projection.
#[derive(Debug, Clone, Default)]
pub struct ImpactProjector {
    config: ImpactConfig,
}

impl ImpactProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ImpactConfig) -> Self {
        ImpactProjector { config }
    }

    /// Project forward from the observed loss.
    ///
    /// When `avg_daily_loss` is `None`, it is derived by spreading the
    /// observed loss over the configured trailing window.
    pub fn project(
        &self,
        observed_loss: f64,
        avg_daily_loss: Option<f64>,
        churned_value: Option<f64>,
    ) -> ImpactProjection {
        let mut assumptions = vec![
            "fixed multiplicative projection model (constant daily loss rate)".to_string(),
        ];

        let avg_daily = match avg_daily_loss {
            Some(v) => v,
            None => {
                assumptions.push(format!(
                    "average daily loss derived from observed loss spread over {} trailing days",
                    self.config.trailing_days
                ));
                observed_loss / self.config.trailing_days as f64
            }
        };

        let churn_ripple = churned_value.map(|v| {
            assumptions.push(format!(
                "churn ripple estimated at {}x churned recurring value",
                self.config.churn_ripple_multiplier
            ));
            v * self.config.churn_ripple_multiplier
        });

        ImpactProjection {
            observed_loss,
            avg_daily_loss: avg_daily,
            monthly_projection: avg_daily * self.config.monthly_days,
            annualized_projection: avg_daily * self.config.annual_days,
            churn_ripple,
            assumptions,
        }
    }

    /// Average per-day loss over the last `trailing_days` calendar days
    /// ending at the latest observed billing day. `None` when there are no
    /// billing records.
    pub fn daily_loss_over_trailing_window(
        &self,
        billing: &[BillingRecord],
        trailing_days: i64,
    ) -> Option<f64> {
        let last_day = billing.iter().map(|r| r.timestamp.date_naive()).max()?;
        let window_start = last_day - Duration::days(trailing_days - 1);
        let loss: f64 = billing
            .iter()
            .filter(|r| r.timestamp.date_naive() >= window_start)
            .map(|r| r.loss())
            .sum();
        Some(loss / trailing_days as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn billing(day: u32, expected: f64, billed: f64) -> BillingRecord {
        let ts: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 3, day, 6, 0, 0).unwrap();
        BillingRecord {
            entity_id: "acme".into(),
            timestamp: ts,
            expected_amount: expected,
            billed_amount: billed,
            region: "us-east".into(),
        }
    }

    #[test]
    fn projections_use_fixed_multipliers() {
        let p = ImpactProjector::new().project(700.0, Some(100.0), None);
        assert_eq!(p.monthly_projection, 3000.0);
        assert_eq!(p.annualized_projection, 36500.0);
        assert_eq!(p.churn_ripple, None);
        assert_eq!(p.assumptions.len(), 1);
    }

    #[test]
    fn missing_daily_loss_is_derived_and_stated() {
        let p = ImpactProjector::new().project(700.0, None, None);
        assert_eq!(p.avg_daily_loss, 100.0);
        assert!(p.assumptions.iter().any(|a| a.contains("trailing")));
    }

    #[test]
    fn churn_ripple_is_separate_and_named() {
        let p = ImpactProjector::new().project(700.0, Some(100.0), Some(200.0));
        assert_eq!(p.churn_ripple, Some(300.0));
        // Ripple never leaks into the headline projections.
        assert_eq!(p.monthly_projection, 3000.0);
        assert!(p.assumptions.iter().any(|a| a.contains("1.5x")));
    }

    #[test]
    fn trailing_window_averages_recent_losses() {
        let projector = ImpactProjector::new();
        let records = vec![
            billing(1, 100.0, 30.0),  // outside a 7-day window ending day 10
            billing(4, 100.0, 60.0),  // inside: loss 40
            billing(9, 100.0, 90.0),  // inside: loss 10
            billing(10, 100.0, 80.0), // inside: loss 20
        ];
        let avg = projector.daily_loss_over_trailing_window(&records, 7).unwrap();
        assert!((avg - 10.0).abs() < 1e-12);
    }

    #[test]
    fn trailing_window_empty_billing_is_none() {
        assert_eq!(
            ImpactProjector::new().daily_loss_over_trailing_window(&[], 7),
            None
        );
    }
}
