//! Subject commands for adding and listing subjects.

use std::io::Write;

use anyhow::{Result, bail};
use serde::Serialize;

use super::util::{format_counters, open_database};
use crate::Config;

#[derive(Debug, Serialize)]
struct SubjectEntry {
    id: String,
    name: String,
    attended: u32,
    total: u32,
}

pub fn add<W: Write>(writer: &mut W, name: &str, config: &Config) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("subject name cannot be empty");
    }

    let user = config.user_id()?;
    let mut db = open_database(config)?;
    let subject = db.create_subject(&user, name)?;
    writeln!(writer, "Added subject {} ({})", subject.name, subject.id)?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, config: &Config, json: bool) -> Result<()> {
    let user = config.user_id()?;
    let db = open_database(config)?;
    let subjects = db.list_subjects(&user)?;

    if json {
        let entries: Vec<SubjectEntry> = subjects
            .into_iter()
            .map(|subject| SubjectEntry {
                id: subject.id.to_string(),
                name: subject.name,
                attended: subject.counters.attended(),
                total: subject.counters.total(),
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if subjects.is_empty() {
        writeln!(writer, "No subjects yet.")?;
        return Ok(());
    }
    for subject in subjects {
        writeln!(
            writer,
            "{}  {}  {}",
            subject.id,
            subject.name,
            format_counters(subject.counters)
        )?;
    }
    Ok(())
}
