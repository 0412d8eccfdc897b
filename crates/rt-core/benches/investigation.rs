//! Criterion benchmarks for the full investigation pipeline.
//!
//! Benchmarks `Investigator::investigate` on synthetic snapshots of one
//! and three months, plus the drift detection hotpath on its own.

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rt_common::{
    BillingRecord, ChurnRecord, EventKind, EventRecord, RecordSet, TransactionRecord,
    TransactionStatus,
};
use rt_core::drift::DriftDetector;
use rt_core::investigate::Investigator;

fn base_ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

/// A synthetic incident: quiet baseline, deployment at 60% of the window,
/// elevated anomaly rate afterwards.
fn snapshot(days: u32, records_per_day: u32) -> RecordSet {
    let deploy_day = days * 6 / 10;
    let mut set = RecordSet::default();
    for day in 0..days {
        let anomalous_share = if day >= deploy_day { 30 } else { 2 };
        for i in 0..records_per_day {
            set.billing.push(BillingRecord {
                entity_id: "acme".into(),
                timestamp: base_ts() + Duration::days(day as i64),
                expected_amount: 100.0,
                billed_amount: if i % 100 < anomalous_share { 70.0 } else { 100.0 },
                region: "us-east".into(),
            });
        }
        if day >= deploy_day {
            set.transactions.push(TransactionRecord {
                entity_id: "acme".into(),
                timestamp: base_ts() + Duration::days(day as i64),
                status: TransactionStatus::Failed,
                amount: 30.0,
            });
        }
    }
    set.events.push(EventRecord {
        entity_id: "acme".into(),
        timestamp: base_ts() + Duration::days(deploy_day as i64),
        version_label: "v5.0.0".into(),
        kind: EventKind::Deployment,
    });
    set.churn.push(ChurnRecord {
        entity_id: "acme".into(),
        timestamp: base_ts() + Duration::days(days as i64 - 1),
        lost_value: 900.0,
        reason: None,
    });
    set
}

fn bench_investigate(c: &mut Criterion) {
    let mut group = c.benchmark_group("investigate/full_pipeline");
    let investigator = Investigator::new();

    for days in [30u32, 90] {
        let records = snapshot(days, 100);
        let analyzed_at = base_ts() + Duration::days(days as i64);
        group.bench_with_input(BenchmarkId::new("days", days), &records, |b, records| {
            b.iter(|| {
                let report = investigator
                    .investigate(black_box("acme"), black_box(records), analyzed_at)
                    .unwrap();
                black_box(report.verdict);
            })
        });
    }

    group.finish();
}

fn bench_drift_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("investigate/drift_detect");
    let detector = DriftDetector::new();

    for days in [30u32, 90, 365] {
        let records = snapshot(days, 100);
        let observations: Vec<(DateTime<Utc>, bool)> = records
            .billing
            .iter()
            .map(|r| (r.timestamp, r.is_anomalous()))
            .collect();
        let boundary = (base_ts() + Duration::days(days as i64 * 6 / 10)).date_naive();
        group.bench_with_input(BenchmarkId::new("days", days), &observations, |b, obs| {
            b.iter(|| {
                let result = detector.detect(black_box(obs), boundary);
                black_box(result.drift_factor);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_investigate, bench_drift_detection);
criterion_main!(benches);
