//! CLI subcommand implementations.

pub mod evaluate;
pub mod history;
pub mod mark;
pub mod reset;
pub mod status;
pub mod subject;
pub mod target;
pub mod util;
