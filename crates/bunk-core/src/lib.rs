//! Core domain logic for safe-bunk attendance tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Counters: the per-subject `(attended, total)` pair and the daily
//!   status transition protocol that mutates it
//! - Calculator: how many classes can be skipped, or must be attended,
//!   to stay at the minimum attendance target
//! - Summary: semester-wide aggregates over all subjects
//!
//! Everything here is pure; callers pass the calendar day and the target in.

pub mod calculator;
pub mod counter;
mod error;
pub mod summary;
pub mod types;

pub use calculator::{Recommendation, Standing, evaluate};
pub use counter::{Counters, Effect};
pub use error::AttendanceError;
pub use summary::{Summary, summarize};
pub use types::{
    AttendanceStatus, DEFAULT_MIN_ATTENDANCE_PERCENT, DailyRecord, SubjectId, Target, UserId,
    ValidationError,
};
