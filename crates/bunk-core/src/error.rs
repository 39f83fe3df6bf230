//! Errors raised by the attendance core.

use thiserror::Error;

use crate::types::AttendanceStatus;

/// Failures of the counter protocol and the safe-bunk calculator.
///
/// None of these are recovered inside the core; the caller decides whether to
/// retry (e.g. after re-reading the stored record) or surface them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AttendanceError {
    /// The attendance target is outside the open interval (0, 1).
    #[error("attendance target must be strictly between 0 and 1, got {value}")]
    InvalidTarget { value: f64 },

    /// Counters would leave `0 <= attended <= total`.
    #[error("counter invariant violated ({attended}/{total}): {reason}")]
    InvariantViolation {
        attended: u64,
        total: u64,
        reason: &'static str,
    },

    /// A correction cited a previous status that is not the stored one.
    #[error(
        "previous status mismatch: expected {}, found {}",
        describe(.expected),
        describe(.found)
    )]
    UnknownPreviousStatus {
        expected: Option<AttendanceStatus>,
        found: Option<AttendanceStatus>,
    },
}

fn describe(status: &Option<AttendanceStatus>) -> &'static str {
    status.map_or("no record", |s| s.as_str())
}
