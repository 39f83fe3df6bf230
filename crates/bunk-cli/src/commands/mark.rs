//! Mark command for recording a day's attendance.

use std::io::Write;

use anyhow::Result;
use bunk_core::AttendanceStatus;
use chrono::NaiveDate;
use clap::Args;

use super::util::{
    format_counters, format_recommendation, open_database, parse_day, require_subject,
};
use crate::Config;

#[derive(Debug, Args)]
pub struct MarkArgs {
    /// Subject name or ID.
    pub subject: String,
    /// present, absent, cancelled or not-marked.
    pub status: AttendanceStatus,
    /// Day to mark: today, yesterday, YYYY-MM-DD or "N days ago".
    #[arg(long, default_value = "today")]
    pub day: String,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &MarkArgs, config: &Config, today: NaiveDate) -> Result<()> {
    let user = config.user_id()?;
    let day = parse_day(&args.day, today)?;
    let mut db = open_database(config)?;
    let subject = require_subject(&db, &user, &args.subject)?;

    let mark = db.record_daily_status(&user, &subject.id, day, args.status)?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&mark)?)?;
        return Ok(());
    }

    let note = match (mark.changed, mark.previous) {
        (false, _) => " (unchanged)".to_string(),
        (true, Some(previous)) => format!(" (was {previous})"),
        (true, None) => String::new(),
    };
    writeln!(writer, "{} on {}: {}{}", subject.name, mark.day, mark.status, note)?;
    writeln!(writer, "Attendance: {}", format_counters(mark.counters))?;
    writeln!(writer, "{}", format_recommendation(&mark.recommendation))?;
    if mark.recommendation.became_safe(&mark.prior_recommendation) {
        writeln!(writer, "Back on target!")?;
    }
    Ok(())
}
