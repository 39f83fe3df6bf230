//! Evaluate command for "what-if" recommendations.
//!
//! Nothing is read from or written to subject records; only the user's target
//! is looked up when `--target` is not given.

use std::io::Write;

use anyhow::Result;
use bunk_core::{Recommendation, Target, evaluate};
use clap::Args;
use serde::Serialize;

use super::util::{format_recommendation, open_database};
use crate::Config;

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Classes attended.
    pub attended: u32,
    /// Classes counted in total.
    pub total: u32,
    /// Target in whole or fractional percent (e.g. 75). Defaults to the user's.
    #[arg(long)]
    pub target: Option<f64>,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Evaluation {
    attended: u32,
    total: u32,
    target_percent: f64,
    recommendation: Recommendation,
}

pub fn run<W: Write>(writer: &mut W, args: &EvaluateArgs, config: &Config) -> Result<()> {
    let target = match args.target {
        Some(percent) => Target::from_percent(percent)?,
        None => {
            let user = config.user_id()?;
            open_database(config)?.target_for(&user)?
        }
    };
    let recommendation = evaluate(args.attended, args.total, target.value())?;

    if args.json {
        let evaluation = Evaluation {
            attended: args.attended,
            total: args.total,
            target_percent: target.percent(),
            recommendation,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&evaluation)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "{}/{} against {target}",
        args.attended, args.total
    )?;
    writeln!(writer, "{}", format_recommendation(&recommendation))?;
    Ok(())
}
