//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use bunk_core::{Counters, Recommendation, UserId};
use bunk_db::{Database, SubjectRecord};
use chrono::{Duration, NaiveDate};
use regex::Regex;

use crate::Config;

/// Pre-compiled regex for relative day parsing.
static RELATIVE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+days?\s+ago$").unwrap());

/// Conservative bound for relative days (~1000 years).
const MAX_DAYS_AGO: i64 = 1000 * 365;

/// Parse a calendar day relative to `today`.
///
/// Supports:
/// - Keywords: "today", "yesterday"
/// - ISO 8601 date: "2026-01-15"
/// - Relative: "3 days ago", "1 day ago"
pub fn parse_day(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(day) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Ok(day);
    }

    let Some(caps) = RELATIVE_DAY_RE.captures(&s) else {
        anyhow::bail!(
            "Invalid day: {s}. Use today, yesterday, YYYY-MM-DD (e.g., 2026-01-15) or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative day")?;
    if n > MAX_DAYS_AGO {
        anyhow::bail!("Relative day too far back: {n} days");
    }

    Ok(today - Duration::days(n))
}

/// Open the configured database, ensuring the parent directory exists.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Look up a subject by ID or name, failing if the user has none.
pub fn require_subject(db: &Database, user: &UserId, key: &str) -> Result<SubjectRecord> {
    db.find_subject(user, key)?
        .with_context(|| format!("subject not found: {key}"))
}

/// `12/15 (80.0%)`
pub fn format_counters(counters: Counters) -> String {
    format!(
        "{}/{} ({:.1}%)",
        counters.attended(),
        counters.total(),
        counters.percentage()
    )
}

/// `SAFE: You can safely bunk 1 classes.`
pub fn format_recommendation(recommendation: &Recommendation) -> String {
    format!("{}: {}", recommendation.status, recommendation.message)
}
