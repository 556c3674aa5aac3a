//! Customs CLI library.
//!
//! Argument parsing, configuration, command execution and output formatting
//! for the `customs` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, Command};
pub use commands::Session;
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
