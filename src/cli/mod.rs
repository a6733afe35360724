//! CLI module for minibase
//!
//! `minibase <database_dir> <input_file> <output_file>` evaluates one query
//! and exits. Success is silent at the default log level; failures are
//! printed to stderr and exit non-zero.

mod args;
mod commands;
mod errors;
mod io;

pub use args::Cli;
pub use commands::{evaluate, run, run_cli, Config, EvaluateOptions, EvaluationSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{create_output, write_explain};
