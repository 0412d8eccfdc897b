//! Error types for Revenue Triage.
//!
//! The inference pipeline has exactly two hard-failure modes:
//!
//! - a record with a missing or corrupt required field (`MalformedRecord`),
//!   which fails fast naming the offending record, since silently coercing
//!   financial fields would corrupt the audit guarantees of the output;
//! - a semantically invalid configuration (`InvalidConfig`), e.g. risk
//!   weights that do not sum to 1.
//!
//! Statistical degeneracies (too few samples for a stddev or a correlation,
//! no candidate triggering event) are never errors: every primitive degrades
//! to a documented neutral value so an investigation always completes,
//! just with lower confidence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::RecordKind;

/// Result type alias for Revenue Triage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input record validation errors.
    Record,
    /// Pipeline configuration errors.
    Config,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Record => write!(f, "record"),
            ErrorCategory::Config => write!(f, "config"),
        }
    }
}

/// Unified error type for Revenue Triage.
#[derive(Error, Debug)]
pub enum Error {
    /// A record is missing a required field or carries a corrupt value
    /// (NaN amount, negative expected amount, empty entity id, ...).
    ///
    /// `kind` and `index` locate the offending record in the input
    /// collection; `field` names the field that failed validation.
    #[error("malformed {kind} record at index {index}: field `{field}`: {reason}")]
    MalformedRecord {
        kind: RecordKind,
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// A component configuration failed semantic validation.
    #[error("invalid {component} configuration: {message}")]
    InvalidConfig {
        component: &'static str,
        message: String,
    },
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Record validation errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidConfig { .. } => 10,
            Error::MalformedRecord { .. } => 20,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MalformedRecord { .. } => ErrorCategory::Record,
            Error::InvalidConfig { .. } => ErrorCategory::Config,
        }
    }
}
