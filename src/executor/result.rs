//! Draining an operator tree into results

use std::io::Write;

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;
use super::tuple::Tuple;

/// Result of driving a root operator to exhaustion
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Tuples in emission order
    pub tuples: Vec<Tuple>,
}

impl ExecutionResult {
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Output lines, one per tuple.
    pub fn lines(&self) -> Vec<String> {
        self.tuples.iter().map(ToString::to_string).collect()
    }
}

/// Pulls every tuple from `root`.
pub fn collect_rows(root: &mut dyn Operator) -> ExecutorResult<ExecutionResult> {
    let mut tuples = Vec::new();
    while let Some(tuple) = root.next()? {
        tuples.push(tuple);
    }
    Ok(ExecutionResult { tuples })
}

/// Streams every tuple from `root` to `out`, one line each.
///
/// Returns the number of lines written.
pub fn write_rows<W: Write>(root: &mut dyn Operator, out: &mut W) -> ExecutorResult<usize> {
    let mut written = 0;
    while let Some(tuple) = root.next()? {
        writeln!(out, "{}", tuple).map_err(ExecutorError::output_failed)?;
        written += 1;
    }
    out.flush().map_err(ExecutorError::output_failed)?;
    Ok(written)
}
