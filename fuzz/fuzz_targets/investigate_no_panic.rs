//! Fuzz target for the investigation orchestrator.
//!
//! Arbitrary record snapshots must never panic the pipeline: malformed
//! records surface as a validation error, everything else completes with
//! a six-step report.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{DateTime, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use rt_common::{
    BillingRecord, ChurnRecord, EventKind, EventRecord, RecordSet, TransactionRecord,
    TransactionStatus,
};
use rt_core::investigate::Investigator;

#[derive(Debug, Arbitrary)]
struct RawBilling {
    entity: u8,
    day_offset: u16,
    // Cents, so summed amounts stay finite for any input length.
    expected_cents: u32,
    billed_cents: u32,
}

#[derive(Debug, Arbitrary)]
struct RawEvent {
    entity: u8,
    day_offset: u16,
    version: String,
    kind: u8,
}

#[derive(Debug, Arbitrary)]
struct RawTransaction {
    entity: u8,
    day_offset: u16,
    failed: bool,
    amount: f64,
}

#[derive(Debug, Arbitrary)]
struct RawChurn {
    entity: u8,
    day_offset: u16,
    lost_value: f64,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    billing: Vec<RawBilling>,
    events: Vec<RawEvent>,
    transactions: Vec<RawTransaction>,
    churn: Vec<RawChurn>,
    analyzed_offset: u16,
}

fn entity(id: u8) -> String {
    format!("entity-{}", id % 4)
}

fn ts(day_offset: u16) -> DateTime<Utc> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    base + chrono::Duration::hours(day_offset as i64)
}

fuzz_target!(|input: FuzzInput| {
    let records = RecordSet {
        billing: input
            .billing
            .into_iter()
            .map(|r| BillingRecord {
                entity_id: entity(r.entity),
                timestamp: ts(r.day_offset),
                expected_amount: r.expected_cents as f64 / 100.0,
                billed_amount: r.billed_cents as f64 / 100.0,
                region: "fuzz".into(),
            })
            .collect(),
        events: input
            .events
            .into_iter()
            .map(|r| EventRecord {
                entity_id: entity(r.entity),
                timestamp: ts(r.day_offset),
                version_label: r.version,
                kind: match r.kind % 4 {
                    0 => EventKind::Deployment,
                    1 => EventKind::ConfigChange,
                    2 => EventKind::Rollback,
                    _ => EventKind::Other,
                },
            })
            .collect(),
        transactions: input
            .transactions
            .into_iter()
            .map(|r| TransactionRecord {
                entity_id: entity(r.entity),
                timestamp: ts(r.day_offset),
                status: if r.failed {
                    TransactionStatus::Failed
                } else {
                    TransactionStatus::Completed
                },
                amount: r.amount,
            })
            .collect(),
        churn: input
            .churn
            .into_iter()
            .map(|r| ChurnRecord {
                entity_id: entity(r.entity),
                timestamp: ts(r.day_offset),
                lost_value: r.lost_value,
                reason: None,
            })
            .collect(),
    };

    let investigator = Investigator::new();
    // Either a validation error or a complete six-step report; never a panic.
    if let Ok(report) = investigator.investigate("entity-0", &records, ts(input.analyzed_offset)) {
        assert_eq!(report.reasoning_steps.len(), 6);
        assert!((-1.0..=1.0).contains(&report.confidence));
        assert!((0.0..=1.0).contains(&report.risk.score));
    }
});
