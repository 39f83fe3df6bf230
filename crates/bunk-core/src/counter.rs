//! Per-subject attendance counters and the daily status transition protocol.
//!
//! A day's status contributes a fixed `(total, attended)` delta. Re-marking a
//! day reverts the old delta and applies the new one in a single step, so the
//! counters only ever move between consistent states.

use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;
use crate::types::AttendanceStatus;

/// Contribution of one status to a subject's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub total: u32,
    pub attended: u32,
}

impl AttendanceStatus {
    /// How much this status adds to the counters relative to "no class".
    #[must_use]
    pub const fn effect(self) -> Effect {
        match self {
            Self::Present => Effect {
                total: 1,
                attended: 1,
            },
            Self::Absent => Effect {
                total: 1,
                attended: 0,
            },
            Self::Cancelled | Self::NotMarked => Effect {
                total: 0,
                attended: 0,
            },
        }
    }
}

/// The `(attended, total)` pair for one subject of one user.
///
/// Fields are private: counters change only through [`Counters::apply_status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCounters")]
pub struct Counters {
    attended: u32,
    total: u32,
}

#[derive(Deserialize)]
struct RawCounters {
    attended: u32,
    total: u32,
}

impl TryFrom<RawCounters> for Counters {
    type Error = AttendanceError;

    fn try_from(raw: RawCounters) -> Result<Self, Self::Error> {
        Self::new(raw.attended, raw.total)
    }
}

impl Counters {
    /// Counters of a freshly created subject.
    pub const ZERO: Self = Self {
        attended: 0,
        total: 0,
    };

    /// Builds counters from stored values, checking `attended <= total`.
    pub fn new(attended: u32, total: u32) -> Result<Self, AttendanceError> {
        if attended > total {
            return Err(violation(
                u64::from(attended),
                u64::from(total),
                "attended exceeds total",
            ));
        }
        Ok(Self { attended, total })
    }

    #[must_use]
    pub const fn attended(self) -> u32 {
        self.attended
    }

    #[must_use]
    pub const fn total(self) -> u32 {
        self.total
    }

    /// Classes counted toward the total but not attended.
    #[must_use]
    pub const fn bunked(self) -> u32 {
        self.total - self.attended
    }

    /// Current attendance as a percentage; 0 when no class has been counted.
    #[must_use]
    pub fn percentage(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.attended) / f64::from(self.total) * 100.0
    }

    /// Moves a day from `previous` (or no record) to `next`.
    ///
    /// Re-marking with the same status is a no-op. Otherwise the previous
    /// status's effect is reverted and the next one applied on a copy, and the
    /// result is returned only if it still satisfies `attended <= total`.
    pub fn apply_status(
        self,
        previous: Option<AttendanceStatus>,
        next: AttendanceStatus,
    ) -> Result<Self, AttendanceError> {
        if previous == Some(next) {
            return Ok(self);
        }
        let base = match previous {
            Some(status) => self.revert(status.effect())?,
            None => self,
        };
        base.add(next.effect())
    }

    fn revert(self, effect: Effect) -> Result<Self, AttendanceError> {
        let underflow = || {
            violation(
                u64::from(self.attended),
                u64::from(self.total),
                "revert would drop counters below zero",
            )
        };
        let attended = self
            .attended
            .checked_sub(effect.attended)
            .ok_or_else(underflow)?;
        let total = self.total.checked_sub(effect.total).ok_or_else(underflow)?;
        Self::new(attended, total)
    }

    fn add(self, effect: Effect) -> Result<Self, AttendanceError> {
        let overflow = || {
            violation(
                u64::from(self.attended),
                u64::from(self.total),
                "counter overflow",
            )
        };
        let attended = self
            .attended
            .checked_add(effect.attended)
            .ok_or_else(overflow)?;
        let total = self.total.checked_add(effect.total).ok_or_else(overflow)?;
        Self::new(attended, total)
    }
}

const fn violation(attended: u64, total: u64, reason: &'static str) -> AttendanceError {
    AttendanceError::InvariantViolation {
        attended,
        total,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::AttendanceStatus::{Absent, Cancelled, NotMarked, Present};

    const ALL: [AttendanceStatus; 4] = [Present, Absent, Cancelled, NotMarked];

    fn counters(attended: u32, total: u32) -> Counters {
        Counters::new(attended, total).unwrap()
    }

    #[test]
    fn first_mark_applies_effect_directly() {
        let base = counters(12, 15);
        assert_eq!(base.apply_status(None, Present).unwrap(), counters(13, 16));
        assert_eq!(base.apply_status(None, Absent).unwrap(), counters(12, 16));
        assert_eq!(base.apply_status(None, Cancelled).unwrap(), base);
        assert_eq!(base.apply_status(None, NotMarked).unwrap(), base);
    }

    #[test]
    fn present_then_cancelled_restores_original_counters() {
        let original = counters(12, 15);
        let marked = original.apply_status(None, Present).unwrap();
        assert_eq!(marked, counters(13, 16));

        let corrected = marked.apply_status(Some(Present), Cancelled).unwrap();
        assert_eq!(corrected, original);
    }

    #[test]
    fn remark_with_same_status_is_idempotent() {
        for status in ALL {
            let marked = counters(4, 6).apply_status(None, status).unwrap();
            let again = marked.apply_status(Some(status), status).unwrap();
            assert_eq!(again, marked, "re-marking {status} changed counters");
        }
    }

    #[test]
    fn correction_matches_marking_only_the_final_status() {
        let base = counters(7, 9);
        for first in ALL {
            for second in ALL {
                let via_correction = base
                    .apply_status(None, first)
                    .and_then(|c| c.apply_status(Some(first), second))
                    .unwrap();
                let direct = base.apply_status(None, second).unwrap();
                assert_eq!(via_correction, direct, "{first} -> {second}");
            }
        }
    }

    #[test]
    fn revert_below_zero_is_invariant_violation() {
        let err = Counters::ZERO
            .apply_status(Some(Present), Absent)
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvariantViolation { .. }));
    }

    #[test]
    fn revert_that_breaks_attended_le_total_is_rejected() {
        // Reverting an Absent from (2, 2) would leave attended 2 of total 1.
        let err = counters(2, 2).apply_status(Some(Absent), Cancelled).unwrap_err();
        assert_eq!(
            err,
            AttendanceError::InvariantViolation {
                attended: 2,
                total: 1,
                reason: "attended exceeds total",
            }
        );
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let full = counters(u32::MAX, u32::MAX);
        let err = full.apply_status(None, Present).unwrap_err();
        assert!(matches!(
            err,
            AttendanceError::InvariantViolation {
                reason: "counter overflow",
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_attended_above_total() {
        assert!(Counters::new(5, 4).is_err());
        assert!(Counters::new(4, 4).is_ok());
    }

    #[test]
    fn deserialize_checks_invariant() {
        let ok: Counters = serde_json::from_str(r#"{"attended":3,"total":5}"#).unwrap();
        assert_eq!(ok, counters(3, 5));
        let bad: Result<Counters, _> = serde_json::from_str(r#"{"attended":6,"total":5}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn percentage_is_zero_without_classes() {
        assert!(Counters::ZERO.percentage().abs() < f64::EPSILON);
        assert!((counters(3, 4).percentage() - 75.0).abs() < 1e-9);
        assert_eq!(counters(3, 4).bunked(), 1);
    }
}
