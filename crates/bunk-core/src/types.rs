//! Core type definitions with validation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AttendanceError;

/// Minimum attendance applied when a user never set one.
pub const DEFAULT_MIN_ATTENDANCE_PERCENT: u8 = 75;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid attendance status value.
    #[error("unknown attendance status: {value}")]
    UnknownStatus { value: String },
}

/// The outcome of one scheduled class on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Cancelled,
    NotMarked,
}

impl AttendanceStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Cancelled => "cancelled",
            Self::NotMarked => "not_marked",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "cancelled" => Ok(Self::Cancelled),
            // "Not Marked" is the label older clients stored
            "not_marked" | "not-marked" | "not marked" => Ok(Self::NotMarked),
            _ => Err(ValidationError::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated user identifier.
    ///
    /// Every subject and attendance record is scoped to exactly one user.
    UserId, "user ID"
);

define_string_id!(
    /// A validated subject identifier.
    SubjectId, "subject ID"
);

const PERCENT_SCALE: f64 = 1e9;

/// Minimum required attendance as a fraction strictly inside (0, 1).
///
/// Out-of-range values are rejected rather than clamped: a target of 1.0 makes
/// the recovery formula divide by zero and a target of 0.0 makes every state
/// trivially safe.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Target(f64);

impl Target {
    /// Creates a target from a fraction such as `0.75`.
    pub fn new(fraction: f64) -> Result<Self, AttendanceError> {
        if fraction.is_nan() || fraction <= 0.0 || fraction >= 1.0 {
            return Err(AttendanceError::InvalidTarget { value: fraction });
        }
        Ok(Self(fraction))
    }

    /// Creates a target from a percentage such as `75`.
    pub fn from_percent(percent: f64) -> Result<Self, AttendanceError> {
        Self::new(percent / 100.0).map_err(|_| AttendanceError::InvalidTarget { value: percent })
    }

    /// Returns the inner fraction.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns the target as a percentage.
    ///
    /// Rounded to nine decimal places so a target built from a whole percent
    /// reports that percent exactly (57, not 56.99999999999999).
    #[must_use]
    pub fn percent(self) -> f64 {
        (self.0 * 100.0 * PERCENT_SCALE).round() / PERCENT_SCALE
    }
}

impl Default for Target {
    fn default() -> Self {
        Self(f64::from(DEFAULT_MIN_ATTENDANCE_PERCENT) / 100.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl TryFrom<f64> for Target {
    type Error = AttendanceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// The single attendance record for one (user, subject, day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub user_id: UserId,
    pub subject_id: SubjectId,
    pub day: NaiveDate,
    pub status: AttendanceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
        assert!(UserId::new("alice").is_ok());
    }

    #[test]
    fn subject_id_serde_roundtrip() {
        let id = SubjectId::new("maths-101").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"maths-101\"");
        let parsed: SubjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn subject_id_serde_rejects_empty() {
        let result: Result<SubjectId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn status_from_str_accepts_aliases() {
        assert_eq!(
            "Present".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Present
        );
        assert_eq!(
            "absent".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Absent
        );
        assert_eq!(
            "CANCELLED".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Cancelled
        );
        assert_eq!(
            "Not Marked".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::NotMarked
        );
        assert_eq!(
            "not-marked".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::NotMarked
        );
        assert!("late".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn status_as_str_roundtrips_through_from_str() {
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Cancelled,
            AttendanceStatus::NotMarked,
        ] {
            assert_eq!(status.as_str().parse::<AttendanceStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&AttendanceStatus::NotMarked).unwrap();
        assert_eq!(json, "\"not_marked\"");
    }

    #[test]
    fn target_validates_open_interval() {
        assert!(Target::new(0.75).is_ok());
        assert!(Target::new(0.01).is_ok());
        assert!(Target::new(0.0).is_err());
        assert!(Target::new(1.0).is_err());
        assert!(Target::new(-0.5).is_err());
        assert!(Target::new(1.5).is_err());
        assert!(Target::new(f64::NAN).is_err());
    }

    #[test]
    fn target_from_percent_reports_original_value() {
        let err = Target::from_percent(100.0).unwrap_err();
        assert_eq!(err, AttendanceError::InvalidTarget { value: 100.0 });
        let target = Target::from_percent(80.0).unwrap();
        assert!((target.value() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for default value"
    )]
    fn target_default_is_seventy_five_percent() {
        assert_eq!(Target::default().value(), 0.75);
        assert_eq!(Target::default().to_string(), "75%");
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "whole percents must come back exactly")]
    fn target_whole_percents_display_without_float_noise() {
        for p in 1..=99_u8 {
            let target = Target::from_percent(f64::from(p)).unwrap();
            assert_eq!(target.to_string(), format!("{p}%"));
            assert_eq!(target.percent(), f64::from(p), "percent {p}");
        }
        assert_eq!(Target::new(0.333).unwrap().to_string(), "33.3%");
    }

    #[test]
    fn target_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Target>("0.6").is_ok());
        assert!(serde_json::from_str::<Target>("1.0").is_err());
        assert!(serde_json::from_str::<Target>("0").is_err());
    }

    #[test]
    fn daily_record_serializes_day_as_date() {
        let record = DailyRecord {
            user_id: UserId::new("alice").unwrap(),
            subject_id: SubjectId::new("physics").unwrap(),
            day: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            status: AttendanceStatus::Present,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["day"], "2025-03-14");
        assert_eq!(json["status"], "present");
    }
}
