//! CLI module for chirpy
//!
//! Provides command-line interface for:
//! - init: Create the database file
//! - serve: Start the HTTP server

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, ServeArgs};
pub use commands::{init, resolve_config, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
