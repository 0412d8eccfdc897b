//! Revenue Triage core: the statistical inference pipeline.
//!
//! Given a materialized snapshot of per-entity billing, deployment-event,
//! transaction, and churn records, the pipeline detects drift from a
//! historical baseline, attributes it to a candidate triggering event,
//! quantifies financial impact, and emits an [`investigate::Investigation`]
//! with a hash-chained reasoning trace.
//!
//! The pipeline is a pure function of its inputs plus an explicit analysis
//! instant; nothing in this crate reads the system clock or performs I/O,
//! so identical inputs always reproduce byte-identical reports.

pub mod attribution;
pub mod cache;
pub mod config;
pub mod correlate;
pub mod daily;
pub mod drift;
pub mod impact;
pub mod investigate;
pub mod logging;
pub mod risk;
pub mod schema;
pub mod store;
pub mod trace;

pub use attribution::{AttributionClass, AttributionScore, EventAttributionScorer};
pub use cache::{SnapshotCache, SnapshotKey};
pub use config::{
    AttributionConfig, CorrelationConfig, DriftConfig, ImpactConfig, InvestigationConfig,
    RiskConfig,
};
pub use correlate::{CorrelationEngine, CorrelationHop, CorrelationStrength, LagCorrelation};
pub use daily::{DailyBucket, DailyRate};
pub use drift::{DriftDetector, DriftResult, SignificanceTier, WelchSummary};
pub use impact::{ImpactProjection, ImpactProjector};
pub use investigate::{Investigation, Investigator, Verdict};
pub use risk::{CompositeRiskScorer, RiskCategory, RiskComponent, RiskScore};
pub use store::InvestigationStore;
pub use trace::{verify_trace, ReasoningStep, TraceBuilder};
