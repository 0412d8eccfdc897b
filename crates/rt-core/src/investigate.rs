//! The investigation orchestrator: a fixed six-stage pipeline.
//!
//! Stages run in order — detect, investigate, correlate, quantify, decide,
//! explain — each consuming the previous stage's output and appending one
//! hash-chained [`ReasoningStep`] to the trace. The result is an
//! [`Investigation`]: the terminal, immutable artifact whose ownership
//! transfers fully to the caller.
//!
//! The orchestrator is a pure function of `(entity, records, analyzed_at,
//! config)`. The analysis instant is always passed in explicitly; nothing
//! here reads the system clock, which makes investigations exactly
//! reproducible.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use rt_common::{EventKind, RecordSet, Result, TransactionStatus};

use crate::attribution::{AttributionScore, EventAttributionScorer};
use crate::config::InvestigationConfig;
use crate::correlate::{CorrelationEngine, CorrelationHop};
use crate::drift::{DriftDetector, DriftResult};
use crate::impact::{ImpactProjection, ImpactProjector};
use crate::risk::{CompositeRiskScorer, RiskScore};
use crate::trace::{ReasoningStep, TraceBuilder};

/// Final verdict of an investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    CausalLinkConfirmed,
    AnomalyDetectedUnclearCause,
}

/// The terminal artifact of one orchestrator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Investigation {
    pub entity: String,
    pub analyzed_at: DateTime<Utc>,
    /// Exactly six entries, one per pipeline stage, hash-chained.
    pub reasoning_steps: Vec<ReasoningStep>,
    pub verdict: Verdict,
    /// The culprit's attribution confidence, or 0.0 without a culprit.
    pub confidence: f64,
    pub drift: DriftResult,
    pub culprit: Option<AttributionScore>,
    pub risk: RiskScore,
    pub impact: ImpactProjection,
    /// Recommended next actions (remediation or diagnostics).
    pub actions: Vec<String>,
    /// Natural-language summary templated from the structured fields.
    pub summary: String,
    /// Digest of the final reasoning step.
    pub trace_digest: String,
}

/// Sequences the pipeline components into investigations.
#[derive(Debug, Clone, Default)]
pub struct Investigator {
    config: InvestigationConfig,
}

impl Investigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an investigator with a validated configuration.
    pub fn with_config(config: InvestigationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Investigator { config })
    }

    pub fn config(&self) -> &InvestigationConfig {
        &self.config
    }

    /// Investigate one entity over a record snapshot as of `analyzed_at`.
    ///
    /// Fails fast with `Error::MalformedRecord` when the snapshot does not
    /// validate; statistical degeneracies never fail.
    pub fn investigate(
        &self,
        entity: &str,
        records: &RecordSet,
        analyzed_at: DateTime<Utc>,
    ) -> Result<Investigation> {
        records.validate()?;

        let records = records.for_entity(entity);
        let mut trace = TraceBuilder::new();

        // Stage 1: detect drift in the billing anomaly rate.
        let observations: Vec<(DateTime<Utc>, bool)> = records
            .billing
            .iter()
            .map(|r| (r.timestamp, r.is_anomalous()))
            .collect();
        let deployments: Vec<_> = records
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Deployment)
            .collect();

        let boundary = self.baseline_boundary(&observations, &deployments, analyzed_at);
        let detector = DriftDetector::with_config(self.config.drift.clone());
        let drift = detector.detect(&observations, boundary);
        trace.push(
            "detect",
            json!({
                "entity": entity,
                "boundary": boundary,
                "observed_days": drift.daily_series.len(),
                "baseline_rate": drift.baseline_rate,
                "current_rate": drift.current_rate,
                "drift_factor": drift.drift_factor,
                "z_score": drift.z_score,
                "significance": drift.significance,
                "is_spike": drift.is_spike,
                "welch": drift.welch,
            }),
        );

        // Stage 2: score every candidate deployment; best becomes culprit.
        let scorer = EventAttributionScorer::with_config(
            self.config.attribution.clone(),
            self.config.drift.clone(),
        );
        let mut candidates: Vec<AttributionScore> = deployments
            .iter()
            .map(|event| scorer.score(&observations, event))
            .collect();
        // Highest confidence first; ties broken by most recent event.
        candidates.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(b.occurred_at.cmp(&a.occurred_at))
        });
        let culprit = candidates.first().cloned();
        trace.push(
            "investigate",
            json!({
                "candidate_count": candidates.len(),
                "candidates": candidates
                    .iter()
                    .map(|c| json!({
                        "version": &c.version,
                        "confidence": c.confidence,
                        "classification": c.classification,
                    }))
                    .collect::<Vec<_>>(),
                "culprit": culprit.as_ref().map(|c| c.version.clone()),
            }),
        );

        // Stage 3: count correlated secondary signals past the onset
        // boundary and lag-search the causal chain.
        let onset_boundary = culprit
            .as_ref()
            .and_then(|c| c.onset_day)
            .or_else(|| culprit.as_ref().map(|c| c.occurred_at.date_naive()))
            .or_else(|| {
                DriftDetector::find_onset(&drift.daily_series, self.config.drift.onset_threshold)
            });

        let failed_tx = count_at_or_after(&records, onset_boundary, |r: &RecordSet, day| {
            r.transactions
                .iter()
                .filter(|t| t.status == TransactionStatus::Failed && t.timestamp.date_naive() >= day)
                .count()
        });
        let churn_events = count_at_or_after(&records, onset_boundary, |r, day| {
            r.churn.iter().filter(|c| c.timestamp.date_naive() >= day).count()
        });
        let churned_value: f64 = match onset_boundary {
            Some(day) => records
                .churn
                .iter()
                .filter(|c| c.timestamp.date_naive() >= day)
                .map(|c| c.lost_value)
                .sum(),
            None => 0.0,
        };

        let engine = CorrelationEngine::with_config(self.config.correlation.clone());
        let chain = self.correlation_chain(&records, &engine);
        trace.push(
            "correlate",
            json!({
                "boundary": onset_boundary,
                "failed_transactions": failed_tx,
                "churn_events": churn_events,
                "churned_value": churned_value,
                "chain": chain,
            }),
        );

        // Stage 4: quantify the observed loss and project it forward.
        let observed_loss: f64 = records.billing.iter().map(|r| r.loss()).sum();
        let projector = ImpactProjector::with_config(self.config.impact.clone());
        let avg_daily = projector
            .daily_loss_over_trailing_window(&records.billing, self.config.impact.trailing_days);
        let churn_input = if records.churn.is_empty() {
            None
        } else {
            Some(churned_value)
        };
        let impact = projector.project(observed_loss, avg_daily, churn_input);
        trace.push(
            "quantify",
            json!({
                "observed_loss": impact.observed_loss,
                "avg_daily_loss": impact.avg_daily_loss,
                "monthly_projection": impact.monthly_projection,
                "annualized_projection": impact.annualized_projection,
                "churn_ripple": impact.churn_ripple,
                "assumptions": &impact.assumptions,
            }),
        );

        // Stage 5: decide the verdict and the action list.
        let confidence = culprit.as_ref().map(|c| c.confidence).unwrap_or(0.0);
        let confirmed = culprit
            .as_ref()
            .map(|c| c.confidence > self.config.confirm_threshold)
            .unwrap_or(false);
        let (verdict, actions) = if confirmed {
            let culprit_version = culprit.as_ref().map(|c| c.version.as_str()).unwrap_or("");
            (
                Verdict::CausalLinkConfirmed,
                vec![
                    format!("roll back version {culprit_version}"),
                    "freeze further deployments for this entity".to_string(),
                    "re-bill the affected window after rollback".to_string(),
                ],
            )
        } else {
            (
                Verdict::AnomalyDetectedUnclearCause,
                vec![
                    "widen the record window and re-run the investigation".to_string(),
                    "review upstream data sources for ingestion gaps".to_string(),
                    "re-run with alternate drift thresholds".to_string(),
                ],
            )
        };
        trace.push(
            "decide",
            json!({
                "verdict": verdict,
                "confidence": confidence,
                "actions": &actions,
            }),
        );

        // The risk score feeds the report but not the verdict.
        let last_event = deployments
            .iter()
            .max_by_key(|e| e.timestamp)
            .map(|e| (**e).clone());
        let risk = CompositeRiskScorer::with_config(self.config.risk.clone()).score(
            &records,
            last_event.as_ref(),
            analyzed_at,
        );

        // Stage 6: template the summary from the structured data.
        let summary = self.render_summary(
            entity, &drift, culprit.as_ref(), observed_loss, failed_tx, churn_events, verdict,
        );
        trace.push("explain", json!({ "summary": &summary }));

        let reasoning_steps = trace.finish();
        let trace_digest = reasoning_steps
            .last()
            .map(|s| s.digest.clone())
            .unwrap_or_default();

        info!(entity, ?verdict, confidence, "investigation complete");

        Ok(Investigation {
            entity: entity.to_string(),
            analyzed_at,
            reasoning_steps,
            verdict,
            confidence,
            drift,
            culprit,
            risk,
            impact,
            actions,
            summary,
            trace_digest,
        })
    }

    /// Investigate several entities and rank the reports by risk score
    /// (descending; ties by entity id).
    pub fn investigate_many(
        &self,
        entities: &[&str],
        records: &RecordSet,
        analyzed_at: DateTime<Utc>,
    ) -> Result<Vec<Investigation>> {
        let mut reports = entities
            .iter()
            .map(|entity| self.investigate(entity, records, analyzed_at))
            .collect::<Result<Vec<_>>>()?;
        reports.sort_by(|a, b| {
            b.risk
                .score
                .total_cmp(&a.risk.score)
                .then_with(|| a.entity.cmp(&b.entity))
        });
        Ok(reports)
    }

    /// Baseline/recent split for stage 1: the latest deployment day when
    /// one exists, else the last observed day minus the configured offset,
    /// else the analysis day.
    fn baseline_boundary(
        &self,
        observations: &[(DateTime<Utc>, bool)],
        deployments: &[&rt_common::EventRecord],
        analyzed_at: DateTime<Utc>,
    ) -> NaiveDate {
        if let Some(latest) = deployments.iter().map(|e| e.timestamp).max() {
            return latest.date_naive();
        }
        let anchor = observations
            .iter()
            .map(|(ts, _)| ts.date_naive())
            .max()
            .unwrap_or_else(|| analyzed_at.date_naive());
        anchor - Duration::days(self.config.baseline_boundary_days)
    }

    /// Daily signals for the deployment -> anomaly -> failure -> churn
    /// chain, aligned over the full observed billing day range.
    fn correlation_chain(
        &self,
        records: &RecordSet,
        engine: &CorrelationEngine,
    ) -> Vec<CorrelationHop> {
        let days: Vec<NaiveDate> = {
            let observed: Vec<NaiveDate> =
                records.billing.iter().map(|r| r.timestamp.date_naive()).collect();
            match (observed.iter().min(), observed.iter().max()) {
                (Some(&first), Some(&last)) => {
                    let mut days = Vec::new();
                    let mut day = first;
                    while day <= last {
                        days.push(day);
                        day = day + Duration::days(1);
                    }
                    days
                }
                _ => return Vec::new(),
            }
        };

        let mut deployments: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for e in records.events.iter().filter(|e| e.kind == EventKind::Deployment) {
            *deployments.entry(e.timestamp.date_naive()).or_insert(0.0) += 1.0;
        }
        let mut anomaly: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
        for r in &records.billing {
            let entry = anomaly.entry(r.timestamp.date_naive()).or_insert((0.0, 0.0));
            entry.0 += 1.0;
            if r.is_anomalous() {
                entry.1 += 1.0;
            }
        }
        let mut failures: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for t in &records.transactions {
            if t.status == TransactionStatus::Failed {
                *failures.entry(t.timestamp.date_naive()).or_insert(0.0) += 1.0;
            }
        }
        let mut churn: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for c in &records.churn {
            *churn.entry(c.timestamp.date_naive()).or_insert(0.0) += c.lost_value;
        }

        let pick = |map: &BTreeMap<NaiveDate, f64>| -> Vec<f64> {
            days.iter().map(|d| map.get(d).copied().unwrap_or(0.0)).collect()
        };
        let anomaly_rates: Vec<f64> = days
            .iter()
            .map(|d| {
                anomaly
                    .get(d)
                    .map(|(total, bad)| if *total > 0.0 { bad / total } else { 0.0 })
                    .unwrap_or(0.0)
            })
            .collect();

        debug!(days = days.len(), "built daily signals for correlation chain");

        engine.chain(&[
            ("deployments", pick(&deployments)),
            ("anomaly_rate", anomaly_rates),
            ("failed_transactions", pick(&failures)),
            ("churned_value", pick(&churn)),
        ])
    }

    #[allow(clippy::too_many_arguments)]
    fn render_summary(
        &self,
        entity: &str,
        drift: &DriftResult,
        culprit: Option<&AttributionScore>,
        observed_loss: f64,
        failed_tx: usize,
        churn_events: usize,
        verdict: Verdict,
    ) -> String {
        let mut summary = format!(
            "Entity {entity}: anomaly rate moved from {:.1}% (baseline) to {:.1}% \
             (drift factor {:.1}x).",
            drift.baseline_rate * 100.0,
            drift.current_rate * 100.0,
            drift.drift_factor,
        );
        match culprit {
            Some(c) => {
                let onset = c
                    .onset_day
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                summary.push_str(&format!(
                    " Most likely trigger: deployment {} (confidence {:.2}, onset {onset}).",
                    c.version, c.confidence,
                ));
            }
            None => summary.push_str(" No candidate triggering event was found."),
        }
        summary.push_str(&format!(
            " Observed loss {observed_loss:.2}; {failed_tx} failed transactions and \
             {churn_events} churn events followed the onset."
        ));
        summary.push_str(match verdict {
            Verdict::CausalLinkConfirmed => " Verdict: causal link confirmed.",
            Verdict::AnomalyDetectedUnclearCause => " Verdict: anomaly detected, cause unclear.",
        });
        summary
    }
}

fn count_at_or_after<F>(records: &RecordSet, boundary: Option<NaiveDate>, count: F) -> usize
where
    F: Fn(&RecordSet, NaiveDate) -> usize,
{
    match boundary {
        Some(day) => count(records, day),
        None => 0,
    }
}
