//! Safe-bunk recommendation.
//!
//! Maps `(attended, total, target)` to either the number of classes that can
//! still be skipped (SAFE) or the number of consecutive classes that must be
//! attended to get back to the target (DANGER).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::counter::Counters;
use crate::error::AttendanceError;
use crate::types::Target;

/// Whether attendance currently meets the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Standing {
    Safe,
    Danger,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Safe => "SAFE",
            Self::Danger => "DANGER",
        })
    }
}

/// What the user can afford to do next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub status: Standing,
    /// SAFE: classes that may be skipped. DANGER: classes that must be attended.
    pub count: u32,
    pub message: String,
}

impl Recommendation {
    fn new(status: Standing, count: u32) -> Self {
        let message = match status {
            Standing::Safe => format!("You can safely bunk {count} classes."),
            Standing::Danger => format!("You must attend the next {count} classes to recover."),
        };
        Self {
            status,
            count,
            message,
        }
    }

    /// True when this result flips a previous DANGER into SAFE.
    #[must_use]
    pub fn became_safe(&self, previous: &Self) -> bool {
        previous.status == Standing::Danger && self.status == Standing::Safe
    }
}

/// Evaluates raw counters against a raw target fraction.
///
/// Fails with [`AttendanceError::InvalidTarget`] unless `0 < target < 1` and
/// with [`AttendanceError::InvariantViolation`] if `attended > total`.
pub fn evaluate(attended: u32, total: u32, target: f64) -> Result<Recommendation, AttendanceError> {
    let target = Target::new(target)?;
    let counters = Counters::new(attended, total)?;
    Ok(counters.evaluate(target))
}

impl Counters {
    /// Evaluates these counters against `target`.
    #[must_use]
    pub fn evaluate(self, target: Target) -> Recommendation {
        let (attended, total) = (u64::from(self.attended()), u64::from(self.total()));
        let g = target.value();

        if total == 0 {
            return Recommendation::new(Standing::Danger, 0);
        }
        if meets(attended, total, g) {
            Recommendation::new(Standing::Safe, safe_bunks(attended, total, g))
        } else {
            Recommendation::new(Standing::Danger, classes_needed(attended, total, g))
        }
    }
}

fn meets(attended: u64, total: u64, target: f64) -> bool {
    total > 0 && as_f64(attended) / as_f64(total) >= target
}

/// Largest `x` with `attended / (total + x) >= target`.
fn safe_bunks(attended: u64, total: u64, target: f64) -> u32 {
    let estimate = (as_f64(attended) / target - as_f64(total)).floor();
    if estimate >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    let mut x = u64::from(to_count(estimate));
    // floor() of a rounded quotient can land one off the exact boundary
    while x > 0 && !meets(attended, total + x, target) {
        x -= 1;
    }
    while meets(attended, total + x + 1, target) {
        x += 1;
    }
    saturate(x)
}

/// Smallest `y` with `(attended + y) / (total + y) >= target`.
fn classes_needed(attended: u64, total: u64, target: f64) -> u32 {
    let estimate = ((target * as_f64(total) - as_f64(attended)) / (1.0 - target)).ceil();
    if estimate >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    let mut y = u64::from(to_count(estimate));
    while !meets(attended + y, total + y, target) {
        y += 1;
    }
    while y > 0 && meets(attended + y - 1, total + y - 1, target) {
        y -= 1;
    }
    saturate(y)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "operands are u32 counters plus a u32-bounded offset"
)]
fn as_f64(value: u64) -> f64 {
    value as f64
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "callers bound the value below u32::MAX; negatives and NaN map to zero"
)]
fn to_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value as u32
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
