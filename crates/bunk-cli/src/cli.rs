//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::evaluate::EvaluateArgs;
use crate::commands::history::HistoryArgs;
use crate::commands::mark::MarkArgs;
use crate::commands::target::TargetArgs;

/// Safe-bunk attendance tracker.
///
/// Tracks per-subject attendance against a minimum target and tells you how
/// many classes you can skip, or how many you must attend to recover.
#[derive(Debug, Parser)]
#[command(name = "bunk", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show or set the minimum attendance percentage.
    Target(TargetArgs),

    /// Manage subjects.
    #[command(subcommand)]
    Subject(SubjectAction),

    /// Mark a day's attendance for a subject.
    Mark(MarkArgs),

    /// List every marked day for a subject.
    History(HistoryArgs),

    /// Show attendance and safe-bunk status for all subjects.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compute a recommendation for hypothetical counters.
    Evaluate(EvaluateArgs),

    /// Delete all subjects and attendance records for the user.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

/// Subject management actions.
#[derive(Debug, Subcommand)]
pub enum SubjectAction {
    /// Add a subject with zeroed counters.
    Add {
        /// Subject name.
        name: String,
    },
    /// List subjects with their counters.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
