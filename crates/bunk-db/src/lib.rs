//! Storage layer for safe-bunk attendance tracking.
//!
//! Provides persistence for users, subjects and daily attendance records using
//! `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Use one `Database` per thread. Writers on separate connections to the same
//! file are serialized by SQLite; each connection waits up to
//! [`BUSY_TIMEOUT`] for the write lock before failing with `SQLITE_BUSY`.
//!
//! # Marking Attendance
//!
//! [`Database::record_daily_status`] is the only path that changes a subject's
//! counters. It runs as a single `BEGIN IMMEDIATE` transaction: the write lock
//! is taken before the existing daily record is read, so two concurrent
//! re-marks of the same day can never both revert the same previous status.
//!
//! # Schema
//!
//! Days are stored as TEXT in `YYYY-MM-DD` form and audit timestamps as
//! ISO 8601 UTC. `(user_id, subject_id, day)` is the primary key of
//! `attendance_logs`, so there is at most one record per subject per day.

use std::path::Path;
use std::time::Duration;

use bunk_core::{
    AttendanceError, AttendanceStatus, Counters, DEFAULT_MIN_ATTENDANCE_PERCENT, DailyRecord,
    Recommendation, SubjectId, Summary, Target, UserId, ValidationError, summarize,
};
use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// How long a connection waits for another writer before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The attendance core refused the operation.
    #[error(transparent)]
    Attendance(#[from] AttendanceError),
    /// An identifier, name or status failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No subject with this key exists for the user.
    #[error("subject not found: {0}")]
    SubjectNotFound(String),
    /// The user already has a subject with this name.
    #[error("subject already exists: {0}")]
    DuplicateSubject(String),
    /// A stored value could not be interpreted.
    #[error("corrupt {table} row {id}: {message}")]
    CorruptRow {
        table: &'static str,
        id: String,
        message: String,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A subject and its current counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRecord {
    pub id: SubjectId,
    pub user_id: UserId,
    pub name: String,
    pub counters: Counters,
}

/// Result of marking one day for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyMark {
    pub subject_id: SubjectId,
    pub day: NaiveDate,
    /// Status stored for the day before this mark, if any.
    pub previous: Option<AttendanceStatus>,
    pub status: AttendanceStatus,
    /// False when the day already had this status.
    pub changed: bool,
    pub counters: Counters,
    pub recommendation: Recommendation,
    /// Recommendation for the counters read inside the same transaction,
    /// before this mark was applied.
    pub prior_recommendation: Recommendation,
}

/// Which previous status a transition is allowed to revert.
#[derive(Debug, Clone, Copy)]
enum Previous {
    /// Whatever is stored; read inside the transaction.
    Stored,
    /// Only this exact status (`None` meaning no record yet).
    Expect(Option<AttendanceStatus>),
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            -- min_attendance: whole percent; NULL means the default (75)
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                min_attendance INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS subjects (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                attended_lectures INTEGER NOT NULL DEFAULT 0,
                total_lectures INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, name),
                CHECK (attended_lectures >= 0 AND attended_lectures <= total_lectures),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_subjects_user ON subjects(user_id);

            -- One row per (user, subject, calendar day)
            -- day: 'YYYY-MM-DD'
            -- status: present | absent | cancelled | not_marked
            CREATE TABLE IF NOT EXISTS attendance_logs (
                user_id TEXT NOT NULL,
                subject_id TEXT NOT NULL,
                day TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, subject_id, day),
                FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_attendance_logs_day ON attendance_logs(day);
            ",
        )?;
        Ok(())
    }

    /// Creates the user profile if it does not exist yet.
    pub fn ensure_user(&self, user_id: &UserId) -> Result<(), DbError> {
        ensure_user(&self.conn, user_id)
    }

    /// Stores the user's minimum attendance percentage.
    ///
    /// The value is validated as a target before it is written.
    pub fn set_min_attendance(&self, user_id: &UserId, percent: u8) -> Result<Target, DbError> {
        let target = Target::from_percent(f64::from(percent))?;
        ensure_user(&self.conn, user_id)?;
        self.conn.execute(
            "UPDATE users SET min_attendance = ? WHERE id = ?",
            params![percent, user_id.as_str()],
        )?;
        tracing::debug!(user = %user_id, %target, "updated minimum attendance");
        Ok(target)
    }

    /// Returns the user's attendance target, falling back to 75%.
    pub fn target_for(&self, user_id: &UserId) -> Result<Target, DbError> {
        read_target(&self.conn, user_id)
    }

    /// Creates a subject with zeroed counters.
    pub fn create_subject(&mut self, user_id: &UserId, name: &str) -> Result<SubjectRecord, DbError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "subject name",
            }
            .into());
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user(&tx, user_id)?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM subjects WHERE user_id = ? AND name = ?)",
            params![user_id.as_str(), name],
            |row| row.get(0),
        )?;
        if exists {
            return Err(DbError::DuplicateSubject(name.to_string()));
        }

        let id = SubjectId::new(Uuid::new_v4().to_string())?;
        let now = now_timestamp();
        tx.execute(
            "
            INSERT INTO subjects (id, user_id, name, attended_lectures, total_lectures, created_at, updated_at)
            VALUES (?1, ?2, ?3, 0, 0, ?4, ?4)
            ",
            params![id.as_str(), user_id.as_str(), name, now],
        )
        .map_err(|err| {
            if is_unique_violation(&err) {
                DbError::DuplicateSubject(name.to_string())
            } else {
                err.into()
            }
        })?;
        tx.commit()?;

        tracing::info!(user = %user_id, subject = %id, name, "created subject");
        Ok(SubjectRecord {
            id,
            user_id: user_id.clone(),
            name: name.to_string(),
            counters: Counters::ZERO,
        })
    }

    /// Lists the user's subjects ordered by name.
    pub fn list_subjects(&self, user_id: &UserId) -> Result<Vec<SubjectRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, user_id, name, attended_lectures, total_lectures
            FROM subjects
            WHERE user_id = ?
            ORDER BY name ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([user_id.as_str()], SubjectRow::from_row)?;
        let mut subjects = Vec::new();
        for row in rows {
            subjects.push(row?.into_record()?);
        }
        Ok(subjects)
    }

    /// Finds one of the user's subjects by ID, or by name if no ID matches.
    pub fn find_subject(
        &self,
        user_id: &UserId,
        key: &str,
    ) -> Result<Option<SubjectRecord>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, user_id, name, attended_lectures, total_lectures
                FROM subjects
                WHERE user_id = ?1 AND (id = ?2 OR name = ?2)
                ORDER BY id = ?2 DESC
                LIMIT 1
                ",
                params![user_id.as_str(), key.trim()],
                SubjectRow::from_row,
            )
            .optional()?;
        row.map(SubjectRow::into_record).transpose()
    }

    /// Marks `day` for a subject and returns the updated counters and
    /// recommendation.
    ///
    /// The existing record for the day (if any) is read under the write lock
    /// and reverted before the new status is applied.
    pub fn record_daily_status(
        &mut self,
        user_id: &UserId,
        subject_id: &SubjectId,
        day: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<DailyMark, DbError> {
        self.transition(user_id, subject_id, day, status, Previous::Stored)
    }

    /// Like [`Self::record_daily_status`], but only if the stored status for
    /// the day is `expected_previous` (`None` meaning no record yet).
    ///
    /// A mismatch fails with [`AttendanceError::UnknownPreviousStatus`] and
    /// writes nothing, so the caller can re-read and retry.
    pub fn correct_daily_status(
        &mut self,
        user_id: &UserId,
        subject_id: &SubjectId,
        day: NaiveDate,
        expected_previous: Option<AttendanceStatus>,
        status: AttendanceStatus,
    ) -> Result<DailyMark, DbError> {
        self.transition(
            user_id,
            subject_id,
            day,
            status,
            Previous::Expect(expected_previous),
        )
    }

    fn transition(
        &mut self,
        user_id: &UserId,
        subject_id: &SubjectId,
        day: NaiveDate,
        status: AttendanceStatus,
        previous: Previous,
    ) -> Result<DailyMark, DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let subject = read_subject(&tx, user_id, subject_id)?
            .ok_or_else(|| DbError::SubjectNotFound(subject_id.to_string()))?;
        let stored = read_status(&tx, user_id, subject_id, day)?;

        if let Previous::Expect(expected) = previous {
            if expected != stored {
                tracing::warn!(
                    user = %user_id,
                    subject = %subject_id,
                    %day,
                    ?expected,
                    ?stored,
                    "rejected correction against stale status"
                );
                return Err(AttendanceError::UnknownPreviousStatus {
                    expected,
                    found: stored,
                }
                .into());
            }
        }

        let counters = subject.counters.apply_status(stored, status)?;
        let changed = stored != Some(status);
        if changed {
            let now = now_timestamp();
            tx.execute(
                "
                INSERT INTO attendance_logs (user_id, subject_id, day, status, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ON CONFLICT(user_id, subject_id, day) DO UPDATE SET
                    status = excluded.status,
                    updated_at = excluded.updated_at
                ",
                params![
                    user_id.as_str(),
                    subject_id.as_str(),
                    format_day(day),
                    status.as_str(),
                    now,
                ],
            )?;
            tx.execute(
                "
                UPDATE subjects
                SET attended_lectures = ?1, total_lectures = ?2, updated_at = ?3
                WHERE id = ?4 AND user_id = ?5
                ",
                params![
                    counters.attended(),
                    counters.total(),
                    now,
                    subject_id.as_str(),
                    user_id.as_str(),
                ],
            )?;
        }
        let target = read_target(&tx, user_id)?;
        tx.commit()?;

        tracing::debug!(
            user = %user_id,
            subject = %subject_id,
            %day,
            ?stored,
            %status,
            attended = counters.attended(),
            total = counters.total(),
            "recorded daily status"
        );

        Ok(DailyMark {
            subject_id: subject_id.clone(),
            day,
            previous: stored,
            status,
            changed,
            counters,
            recommendation: counters.evaluate(target),
            prior_recommendation: subject.counters.evaluate(target),
        })
    }

    /// Returns the status recorded for `day`, if any.
    pub fn status_on(
        &self,
        user_id: &UserId,
        subject_id: &SubjectId,
        day: NaiveDate,
    ) -> Result<Option<AttendanceStatus>, DbError> {
        read_status(&self.conn, user_id, subject_id, day)
    }

    /// Lists every daily record for a subject, oldest first.
    pub fn daily_records(
        &self,
        user_id: &UserId,
        subject_id: &SubjectId,
    ) -> Result<Vec<DailyRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT day, status
            FROM attendance_logs
            WHERE user_id = ? AND subject_id = ?
            ORDER BY day ASC
            ",
        )?;
        let rows = stmt.query_map([user_id.as_str(), subject_id.as_str()], |row| {
            let day: String = row.get(0)?;
            let status: String = row.get(1)?;
            Ok((day, status))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (day, status) = row?;
            records.push(DailyRecord {
                user_id: user_id.clone(),
                subject_id: subject_id.clone(),
                day: parse_day(&day, subject_id)?,
                status: status.parse()?,
            });
        }
        Ok(records)
    }

    /// Aggregates all of the user's subjects against their target.
    pub fn semester_summary(&self, user_id: &UserId) -> Result<Summary, DbError> {
        let counters: Vec<Counters> = self
            .list_subjects(user_id)?
            .into_iter()
            .map(|subject| subject.counters)
            .collect();
        let target = self.target_for(user_id)?;
        Ok(summarize(&counters, target)?)
    }

    /// Deletes all of the user's subjects and attendance records.
    ///
    /// Returns the number of subjects removed. The user profile is kept.
    pub fn reset(&mut self, user_id: &UserId) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        let logs = tx.execute(
            "DELETE FROM attendance_logs WHERE user_id = ?",
            [user_id.as_str()],
        )?;
        let subjects = tx.execute("DELETE FROM subjects WHERE user_id = ?", [user_id.as_str()])?;
        tx.commit()?;
        tracing::info!(user = %user_id, subjects, logs, "reset attendance data");
        Ok(subjects)
    }
}

#[derive(Debug)]
struct SubjectRow {
    id: String,
    user_id: String,
    name: String,
    attended: i64,
    total: i64,
}

impl SubjectRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            attended: row.get(3)?,
            total: row.get(4)?,
        })
    }

    fn into_record(self) -> Result<SubjectRecord, DbError> {
        let corrupt = |message: &str| DbError::CorruptRow {
            table: "subjects",
            id: self.id.clone(),
            message: message.to_string(),
        };
        let attended =
            u32::try_from(self.attended).map_err(|_| corrupt("attended_lectures out of range"))?;
        let total =
            u32::try_from(self.total).map_err(|_| corrupt("total_lectures out of range"))?;
        Ok(SubjectRecord {
            counters: Counters::new(attended, total)?,
            id: SubjectId::new(self.id)?,
            user_id: UserId::new(self.user_id)?,
            name: self.name,
        })
    }
}

fn ensure_user(conn: &Connection, user_id: &UserId) -> Result<(), DbError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, created_at) VALUES (?, ?)",
        params![user_id.as_str(), now_timestamp()],
    )?;
    if inserted > 0 {
        tracing::debug!(user = %user_id, "created user profile");
    }
    Ok(())
}

fn read_target(conn: &Connection, user_id: &UserId) -> Result<Target, DbError> {
    let stored: Option<Option<i64>> = conn
        .query_row(
            "SELECT min_attendance FROM users WHERE id = ?",
            [user_id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    let Some(percent) = stored.flatten() else {
        return Ok(Target::from_percent(f64::from(DEFAULT_MIN_ATTENDANCE_PERCENT))?);
    };
    let percent = u8::try_from(percent).map_err(|_| DbError::CorruptRow {
        table: "users",
        id: user_id.to_string(),
        message: format!("min_attendance out of range: {percent}"),
    })?;
    Ok(Target::from_percent(f64::from(percent))?)
}

fn read_subject(
    conn: &Connection,
    user_id: &UserId,
    subject_id: &SubjectId,
) -> Result<Option<SubjectRecord>, DbError> {
    let row = conn
        .query_row(
            "
            SELECT id, user_id, name, attended_lectures, total_lectures
            FROM subjects
            WHERE id = ? AND user_id = ?
            ",
            [subject_id.as_str(), user_id.as_str()],
            SubjectRow::from_row,
        )
        .optional()?;
    row.map(SubjectRow::into_record).transpose()
}

fn read_status(
    conn: &Connection,
    user_id: &UserId,
    subject_id: &SubjectId,
    day: NaiveDate,
) -> Result<Option<AttendanceStatus>, DbError> {
    let status: Option<String> = conn
        .query_row(
            "
            SELECT status FROM attendance_logs
            WHERE user_id = ? AND subject_id = ? AND day = ?
            ",
            params![user_id.as_str(), subject_id.as_str(), format_day(day)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(status.map(|s| s.parse()).transpose()?)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn parse_day(day: &str, subject_id: &SubjectId) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|err| DbError::CorruptRow {
        table: "attendance_logs",
        id: format!("{subject_id}@{day}"),
        message: err.to_string(),
    })
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
