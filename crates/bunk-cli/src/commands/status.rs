//! Status command for showing every subject against the attendance target.
//!
//! This module implements `bunk status`, which lists each subject's counters
//! and recommendation followed by the semester-wide aggregate.

use std::io::Write;

use anyhow::Result;
use bunk_core::{Recommendation, Summary};
use bunk_db::Database;
use serde::Serialize;

use super::util::{format_recommendation, open_database};
use crate::Config;

// ========== Status Data ==========

/// One subject row for display.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectStatus {
    pub id: String,
    pub name: String,
    pub attended: u32,
    pub total: u32,
    pub percentage: f64,
    pub recommendation: Recommendation,
}

/// Everything `bunk status` shows.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub target_percent: f64,
    pub subjects: Vec<SubjectStatus>,
    pub summary: Summary,
}

/// Collect per-subject status and the semester summary for the user.
pub fn get_status(db: &Database, config: &Config) -> Result<StatusReport> {
    let user = config.user_id()?;
    let target = db.target_for(&user)?;

    let subjects = db
        .list_subjects(&user)?
        .into_iter()
        .map(|subject| SubjectStatus {
            id: subject.id.to_string(),
            name: subject.name,
            attended: subject.counters.attended(),
            total: subject.counters.total(),
            percentage: subject.counters.percentage(),
            recommendation: subject.counters.evaluate(target),
        })
        .collect();

    Ok(StatusReport {
        target_percent: target.percent(),
        subjects,
        summary: db.semester_summary(&user)?,
    })
}

// ========== Human-Readable Output ==========

fn write_status<W: Write>(writer: &mut W, report: &StatusReport) -> Result<()> {
    writeln!(writer, "ATTENDANCE (target {}%)", report.target_percent)?;
    writeln!(writer)?;

    if report.subjects.is_empty() {
        writeln!(writer, "No subjects yet.")?;
        writeln!(writer)?;
        writeln!(writer, "Hint: Run 'bunk subject add <name>' to start tracking.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<20}  {:>8}  {:>6}  {:>7}  Status",
        "Subject", "Attended", "Total", "Percent"
    )?;
    writeln!(
        writer,
        "────────────────────  ────────  ──────  ───────  ──────────────"
    )?;
    for subject in &report.subjects {
        // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
        let name = if subject.name.chars().count() > 20 {
            format!("{}...", subject.name.chars().take(17).collect::<String>())
        } else {
            subject.name.clone()
        };
        writeln!(
            writer,
            "{:<20}  {:>8}  {:>6}  {:>6.1}%  {} {}",
            name,
            subject.attended,
            subject.total,
            subject.percentage,
            subject.recommendation.status,
            subject.recommendation.count
        )?;
    }

    let summary = &report.summary;
    writeln!(writer)?;
    writeln!(
        writer,
        "Overall: {}/{} ({:.1}%), {} bunked",
        summary.attended, summary.total, summary.percentage, summary.bunked
    )?;
    writeln!(writer, "{}", format_recommendation(&summary.recommendation))?;
    Ok(())
}

pub fn run<W: Write>(writer: &mut W, config: &Config, json: bool) -> Result<()> {
    let db = open_database(config)?;
    let report = get_status(&db, config)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }
    write_status(writer, &report)
}
