//! Reset command for wiping a user's attendance data.

use std::io::Write;

use anyhow::{Result, bail};

use super::util::open_database;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("refusing to reset without --yes");
    }
    let user = config.user_id()?;
    let mut db = open_database(config)?;
    let removed = db.reset(&user)?;
    writeln!(writer, "Removed {removed} subjects for {user}.")?;
    Ok(())
}
