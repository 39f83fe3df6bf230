//! History command for listing a subject's marked days.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::util::{open_database, require_subject};
use crate::Config;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Subject name or ID.
    pub subject: String,
}

pub fn run<W: Write>(writer: &mut W, args: &HistoryArgs, config: &Config) -> Result<()> {
    let user = config.user_id()?;
    let db = open_database(config)?;
    let subject = require_subject(&db, &user, &args.subject)?;
    let records = db.daily_records(&user, &subject.id)?;

    writeln!(writer, "{}", subject.name)?;
    if records.is_empty() {
        writeln!(writer, "No days marked.")?;
        return Ok(());
    }
    for record in records {
        writeln!(writer, "{}  {}", record.day, record.status)?;
    }
    Ok(())
}
