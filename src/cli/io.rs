//! Output handling for the CLI
//!
//! - Result rows go to the output file, one line per tuple
//! - Plan explanations go to stdout
//! - UTF-8 only

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::planner::ExplainPlan;

use super::errors::{CliError, CliResult};

/// Create (or truncate) the output file, creating missing parent
/// directories.
pub fn create_output(path: &Path) -> CliResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::io_error(format!(
                    "Failed to create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        CliError::io_error(format!(
            "Failed to create output file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

/// Write a plan explanation to stdout
pub fn write_explain(plan: &ExplainPlan) -> CliResult<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", plan)?;
    stdout.flush()?;

    Ok(())
}
