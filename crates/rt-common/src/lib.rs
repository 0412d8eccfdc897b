//! Revenue Triage shared types: input records, validation, and errors.

pub mod error;
pub mod record;

pub use error::{Error, ErrorCategory, Result};
pub use record::{
    BillingRecord, ChurnRecord, EventKind, EventRecord, RecordKind, RecordSet, TransactionRecord,
    TransactionStatus,
};
