//! JSON Schema generation for public artifact types.
//!
//! Embedders validate pipeline output, generate client code, or document
//! the output format from these schemas. Every serializable artifact and
//! input record type is exported.

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

// Re-export types that have schemas
pub use crate::attribution::{AttributionClass, AttributionScore};
pub use crate::correlate::{CorrelationHop, CorrelationStrength, LagCorrelation};
pub use crate::daily::{DailyBucket, DailyRate};
pub use crate::drift::{DriftResult, SignificanceTier, WelchSummary};
pub use crate::impact::ImpactProjection;
pub use crate::investigate::{Investigation, Verdict};
pub use crate::risk::{RiskCategory, RiskComponent, RiskScore};
pub use crate::trace::ReasoningStep;
pub use rt_common::{
    BillingRecord, ChurnRecord, EventKind, EventRecord, RecordSet, TransactionRecord,
    TransactionStatus,
};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Input record types
        ("BillingRecord", "Single billing observation for one entity"),
        ("EventRecord", "Candidate triggering event (e.g. deployment)"),
        ("TransactionRecord", "Secondary-signal transaction"),
        ("ChurnRecord", "Entity churn event with lost value"),
        ("RecordSet", "Materialized snapshot of all input records"),
        // Derived artifacts
        ("DailyBucket", "Per-day aggregated counts for one metric"),
        ("DailyRate", "Daily rate series entry with drift factor"),
        ("DriftResult", "Baseline/current drift detection outcome"),
        ("SignificanceTier", "z-score significance tier"),
        ("WelchSummary", "Welch's t-test confirmation of a drift"),
        ("LagCorrelation", "Best-lag correlation between two signals"),
        ("CorrelationStrength", "Strength bucket of a correlation"),
        ("CorrelationHop", "One hop of a correlation chain"),
        ("AttributionScore", "Confidence-scored candidate event attribution"),
        ("AttributionClass", "Qualitative attribution classification"),
        ("RiskScore", "Composite risk score with component audit"),
        ("RiskComponent", "Raw/normalized/weighted risk component"),
        ("RiskCategory", "Severity bucket of a risk score"),
        ("ImpactProjection", "Loss projection with named assumptions"),
        // Investigation output
        ("ReasoningStep", "Hash-chained reasoning trace entry"),
        ("Verdict", "Final investigation verdict"),
        ("Investigation", "Complete investigation report"),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns the schema as a serde_json::Value, or None if the type is
/// unknown.
pub fn schema_for_name(name: &str) -> Option<Value> {
    let schema = match name {
        "BillingRecord" => schema_for!(BillingRecord),
        "EventRecord" => schema_for!(EventRecord),
        "TransactionRecord" => schema_for!(TransactionRecord),
        "ChurnRecord" => schema_for!(ChurnRecord),
        "RecordSet" => schema_for!(RecordSet),
        "DailyBucket" => schema_for!(DailyBucket),
        "DailyRate" => schema_for!(DailyRate),
        "DriftResult" => schema_for!(DriftResult),
        "SignificanceTier" => schema_for!(SignificanceTier),
        "WelchSummary" => schema_for!(WelchSummary),
        "LagCorrelation" => schema_for!(LagCorrelation),
        "CorrelationStrength" => schema_for!(CorrelationStrength),
        "CorrelationHop" => schema_for!(CorrelationHop),
        "AttributionScore" => schema_for!(AttributionScore),
        "AttributionClass" => schema_for!(AttributionClass),
        "RiskScore" => schema_for!(RiskScore),
        "RiskComponent" => schema_for!(RiskComponent),
        "RiskCategory" => schema_for!(RiskCategory),
        "ImpactProjection" => schema_for!(ImpactProjection),
        "ReasoningStep" => schema_for!(ReasoningStep),
        "Verdict" => schema_for!(Verdict),
        "Investigation" => schema_for!(Investigation),
        _ => return None,
    };
    serde_json::to_value(schema).ok()
}

/// Generate schemas for all available types, keyed by type name.
pub fn all_schemas() -> BTreeMap<&'static str, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| schema_for_name(name).map(|s| (name, s)))
        .collect()
}
