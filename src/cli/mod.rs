//! CLI module for agora
//!
//! - start: load config, verify descriptors, serve until stopped
//! - check-config: the same checks without serving

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_state, check_config, run, run_command, start, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
