//! Safe-bunk attendance tracker CLI library.
//!
//! This crate provides the CLI interface on top of `bunk-core` and `bunk-db`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, SubjectAction};
pub use config::Config;
