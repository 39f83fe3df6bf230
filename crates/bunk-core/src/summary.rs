//! Semester-wide aggregate attendance.

use serde::Serialize;

use crate::calculator::Recommendation;
use crate::counter::Counters;
use crate::error::AttendanceError;
use crate::types::Target;

/// Totals across every subject, evaluated as if they were one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub attended: u32,
    pub total: u32,
    pub bunked: u32,
    pub percentage: f64,
    pub recommendation: Recommendation,
}

/// Sums per-subject counters and evaluates the result against `target`.
pub fn summarize(subjects: &[Counters], target: Target) -> Result<Summary, AttendanceError> {
    let (attended, total) = subjects.iter().try_fold((0_u32, 0_u32), |(a, t), c| {
        match (a.checked_add(c.attended()), t.checked_add(c.total())) {
            (Some(a), Some(t)) => Ok((a, t)),
            _ => Err(AttendanceError::InvariantViolation {
                attended: u64::from(a) + u64::from(c.attended()),
                total: u64::from(t) + u64::from(c.total()),
                reason: "aggregate counters overflow",
            }),
        }
    })?;
    let combined = Counters::new(attended, total)?;

    Ok(Summary {
        attended,
        total,
        bunked: combined.bunked(),
        percentage: combined.percentage(),
        recommendation: combined.evaluate(target),
    })
}
