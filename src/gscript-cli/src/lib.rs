//! gscript-cli library
//!
//! Provides the CLI definition, configuration, subcommand dispatch, output
//! helpers and REPL for programmatic use and testing.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use config::Config;
pub use error::{Error, Result};
