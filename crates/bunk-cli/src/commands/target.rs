//! Target command for showing or setting the minimum attendance.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// New minimum attendance in whole percent (1-99). Omit to show the current one.
    pub percent: Option<u8>,
}

pub fn run<W: Write>(writer: &mut W, args: &TargetArgs, config: &Config) -> Result<()> {
    let user = config.user_id()?;
    let db = open_database(config)?;

    match args.percent {
        Some(percent) => {
            let target = db.set_min_attendance(&user, percent)?;
            writeln!(writer, "Minimum attendance set to {target}")?;
        }
        None => {
            let target = db.target_for(&user)?;
            writeln!(writer, "Minimum attendance: {target}")?;
        }
    }
    Ok(())
}
