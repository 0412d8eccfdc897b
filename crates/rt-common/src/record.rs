//! Input record types consumed by the inference pipeline.
//!
//! Records are materialized snapshots handed in by the caller's data-fetch
//! layer; the core only reads, filters, and groups them. All timestamps are
//! UTC, serialized as ISO-8601. A [`RecordSet`] bundles one snapshot and
//! owns the fail-fast validation described in the error module.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kinds of input records, used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Billing,
    Event,
    Transaction,
    Churn,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Billing => write!(f, "billing"),
            RecordKind::Event => write!(f, "event"),
            RecordKind::Transaction => write!(f, "transaction"),
            RecordKind::Churn => write!(f, "churn"),
        }
    }
}

/// A single billing observation for one entity.
///
/// The observation is anomalous iff the entity was billed less than
/// expected; the shortfall is the observed loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BillingRecord {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub expected_amount: f64,
    pub billed_amount: f64,
    pub region: String,
}

impl BillingRecord {
    /// True when the entity was billed less than expected.
    pub fn is_anomalous(&self) -> bool {
        self.billed_amount < self.expected_amount
    }

    /// Revenue shortfall for this record; never negative.
    pub fn loss(&self) -> f64 {
        (self.expected_amount - self.billed_amount).max(0.0)
    }
}

/// Kind of a candidate triggering event.
///
/// Unknown kinds on the wire deserialize to [`EventKind::Other`]; only
/// deployments participate in attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Deployment,
    ConfigChange,
    Rollback,
    #[serde(other)]
    Other,
}

/// A candidate triggering event (e.g. a deployment) for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventRecord {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub version_label: String,
    pub kind: EventKind,
}

/// Status of a secondary-signal transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Failed,
    Pending,
    #[serde(other)]
    Other,
}

/// A secondary-signal transaction for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransactionRecord {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub amount: f64,
}

/// A churn event: an entity-attributed loss of recurring value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChurnRecord {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub lost_value: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// One materialized snapshot of input records.
///
/// The caller fetches whatever window it wants and hands the collections
/// over by value; the pipeline never queries a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecordSet {
    #[serde(default)]
    pub billing: Vec<BillingRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub churn: Vec<ChurnRecord>,
}

impl RecordSet {
    /// A snapshot narrowed to one entity.
    pub fn for_entity(&self, entity_id: &str) -> RecordSet {
        RecordSet {
            billing: self
                .billing
                .iter()
                .filter(|r| r.entity_id == entity_id)
                .cloned()
                .collect(),
            events: self
                .events
                .iter()
                .filter(|r| r.entity_id == entity_id)
                .cloned()
                .collect(),
            transactions: self
                .transactions
                .iter()
                .filter(|r| r.entity_id == entity_id)
                .cloned()
                .collect(),
            churn: self
                .churn
                .iter()
                .filter(|r| r.entity_id == entity_id)
                .cloned()
                .collect(),
        }
    }

    /// Entity ids present anywhere in the snapshot, deduplicated and sorted.
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .billing
            .iter()
            .map(|r| r.entity_id.clone())
            .chain(self.events.iter().map(|r| r.entity_id.clone()))
            .chain(self.transactions.iter().map(|r| r.entity_id.clone()))
            .chain(self.churn.iter().map(|r| r.entity_id.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.billing.is_empty()
            && self.events.is_empty()
            && self.transactions.is_empty()
            && self.churn.is_empty()
    }

    /// Total record count across all collections.
    pub fn len(&self) -> usize {
        self.billing.len() + self.events.len() + self.transactions.len() + self.churn.len()
    }

    /// Fail-fast validation of every record in the snapshot.
    ///
    /// Returns `Error::MalformedRecord` naming the first offending record
    /// (kind, index, field). NaN or negative amounts, empty entity ids, and
    /// empty version labels are rejected; missing optional fields are not.
    pub fn validate(&self) -> Result<()> {
        for (i, r) in self.billing.iter().enumerate() {
            require_entity(RecordKind::Billing, i, &r.entity_id)?;
            require_finite(RecordKind::Billing, i, "expected_amount", r.expected_amount)?;
            require_finite(RecordKind::Billing, i, "billed_amount", r.billed_amount)?;
            require_non_negative(RecordKind::Billing, i, "expected_amount", r.expected_amount)?;
            require_non_negative(RecordKind::Billing, i, "billed_amount", r.billed_amount)?;
        }
        for (i, r) in self.events.iter().enumerate() {
            require_entity(RecordKind::Event, i, &r.entity_id)?;
            if r.version_label.is_empty() {
                return Err(Error::MalformedRecord {
                    kind: RecordKind::Event,
                    index: i,
                    field: "version_label",
                    reason: "empty version label".into(),
                });
            }
        }
        for (i, r) in self.transactions.iter().enumerate() {
            require_entity(RecordKind::Transaction, i, &r.entity_id)?;
            require_finite(RecordKind::Transaction, i, "amount", r.amount)?;
        }
        for (i, r) in self.churn.iter().enumerate() {
            require_entity(RecordKind::Churn, i, &r.entity_id)?;
            require_finite(RecordKind::Churn, i, "lost_value", r.lost_value)?;
            require_non_negative(RecordKind::Churn, i, "lost_value", r.lost_value)?;
        }
        Ok(())
    }
}

fn require_entity(kind: RecordKind, index: usize, entity_id: &str) -> Result<()> {
    if entity_id.is_empty() {
        return Err(Error::MalformedRecord {
            kind,
            index,
            field: "entity_id",
            reason: "empty entity id".into(),
        });
    }
    Ok(())
}

fn require_finite(kind: RecordKind, index: usize, field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::MalformedRecord {
            kind,
            index,
            field,
            reason: format!("value is not finite: {value}"),
        });
    }
    Ok(())
}

fn require_non_negative(
    kind: RecordKind,
    index: usize,
    field: &'static str,
    value: f64,
) -> Result<()> {
    if value < 0.0 {
        return Err(Error::MalformedRecord {
            kind,
            index,
            field,
            reason: format!("negative amount: {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn billing(entity: &str, day: u32, expected: f64, billed: f64) -> BillingRecord {
        BillingRecord {
            entity_id: entity.into(),
            timestamp: ts(day),
            expected_amount: expected,
            billed_amount: billed,
            region: "eu-west".into(),
        }
    }

    #[test]
    fn anomaly_and_loss() {
        let ok = billing("acme", 1, 100.0, 100.0);
        assert!(!ok.is_anomalous());
        assert_eq!(ok.loss(), 0.0);

        let short = billing("acme", 1, 100.0, 60.0);
        assert!(short.is_anomalous());
        assert_eq!(short.loss(), 40.0);

        // Overbilling is not a loss.
        let over = billing("acme", 1, 100.0, 120.0);
        assert!(!over.is_anomalous());
        assert_eq!(over.loss(), 0.0);
    }

    #[test]
    fn for_entity_filters_every_collection() {
        let set = RecordSet {
            billing: vec![billing("acme", 1, 100.0, 100.0), billing("globex", 1, 50.0, 50.0)],
            events: vec![EventRecord {
                entity_id: "acme".into(),
                timestamp: ts(2),
                version_label: "v2.1.0".into(),
                kind: EventKind::Deployment,
            }],
            transactions: vec![TransactionRecord {
                entity_id: "globex".into(),
                timestamp: ts(2),
                status: TransactionStatus::Failed,
                amount: 12.0,
            }],
            churn: vec![],
        };

        let acme = set.for_entity("acme");
        assert_eq!(acme.billing.len(), 1);
        assert_eq!(acme.events.len(), 1);
        assert!(acme.transactions.is_empty());
        assert_eq!(set.entity_ids(), vec!["acme".to_string(), "globex".to_string()]);
    }

    #[test]
    fn validate_rejects_nan_amount_with_location() {
        let mut set = RecordSet::default();
        set.billing.push(billing("acme", 1, 100.0, 100.0));
        set.billing.push(billing("acme", 2, f64::NAN, 90.0));

        let err = set.validate().unwrap_err();
        match err {
            Error::MalformedRecord { kind, index, field, .. } => {
                assert_eq!(kind, RecordKind::Billing);
                assert_eq!(index, 1);
                assert_eq!(field, "expected_amount");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_rejects_empty_entity_and_version() {
        let mut set = RecordSet::default();
        set.churn.push(ChurnRecord {
            entity_id: String::new(),
            timestamp: ts(3),
            lost_value: 10.0,
            reason: None,
        });
        assert!(set.validate().is_err());

        let mut set = RecordSet::default();
        set.events.push(EventRecord {
            entity_id: "acme".into(),
            timestamp: ts(3),
            version_label: String::new(),
            kind: EventKind::Deployment,
        });
        assert!(set.validate().is_err());
    }

    #[test]
    fn empty_set_is_valid() {
        assert!(RecordSet::default().validate().is_ok());
        assert!(RecordSet::default().is_empty());
        assert_eq!(RecordSet::default().len(), 0);
    }

    #[test]
    fn unknown_event_kind_deserializes_to_other() {
        let json = r#"{"entity_id":"acme","timestamp":"2026-03-01T00:00:00Z","version_label":"v1","kind":"maintenance"}"#;
        let rec: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.kind, EventKind::Other);
    }

    #[test]
    fn record_wire_format_is_snake_case() {
        let rec = TransactionRecord {
            entity_id: "acme".into(),
            timestamp: ts(1),
            status: TransactionStatus::Failed,
            amount: 3.5,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains(r#""status":"failed""#));
    }
}
