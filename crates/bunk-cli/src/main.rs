use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bunk_cli::commands::{evaluate, history, mark, reset, status, subject, target};
use bunk_cli::{Cli, Commands, Config, SubjectAction};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Target(args) => target::run(&mut stdout, args, &config)?,
        Commands::Subject(SubjectAction::Add { name }) => subject::add(&mut stdout, name, &config)?,
        Commands::Subject(SubjectAction::List { json }) => {
            subject::list(&mut stdout, &config, *json)?;
        }
        Commands::Mark(args) => {
            let today = chrono::Local::now().date_naive();
            mark::run(&mut stdout, args, &config, today)?;
        }
        Commands::History(args) => history::run(&mut stdout, args, &config)?,
        Commands::Status { json } => status::run(&mut stdout, &config, *json)?,
        Commands::Evaluate(args) => evaluate::run(&mut stdout, args, &config)?,
        Commands::Reset { yes } => reset::run(&mut stdout, &config, *yes)?,
    }

    Ok(())
}
