//! CLI subcommands.

pub mod deploy;
pub mod prompt;
pub mod setup;
