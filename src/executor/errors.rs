//! Executor error types
//!
//! Error codes:
//! - MINI_EXECUTION_FAILED (ERROR)
//! - MINI_MALFORMED_ROW (FATAL)
//! - MINI_STORAGE_FAILED (FATAL)
//! - MINI_AGGREGATE_OVERFLOW (ERROR)
//! - MINI_OUTPUT_FAILED (ERROR)
//!
//! Comparison type mismatches are not errors: they make the comparison
//! false and filter the tuple out.

use std::fmt;
use std::io;

use crate::storage::StorageError;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Evaluation failed
    Error,
    /// Input data is unusable
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// General execution failure (operator misuse, unbound column)
    MiniExecutionFailed,
    /// Data row does not match the declared relation schema
    MiniMalformedRow,
    /// Relation file could not be opened or read
    MiniStorageFailed,
    /// SUM accumulator left the i64 range
    MiniAggregateOverflow,
    /// Result could not be written
    MiniOutputFailed,
}

impl ExecutorErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::MiniExecutionFailed => "MINI_EXECUTION_FAILED",
            ExecutorErrorCode::MiniMalformedRow => "MINI_MALFORMED_ROW",
            ExecutorErrorCode::MiniStorageFailed => "MINI_STORAGE_FAILED",
            ExecutorErrorCode::MiniAggregateOverflow => "MINI_AGGREGATE_OVERFLOW",
            ExecutorErrorCode::MiniOutputFailed => "MINI_OUTPUT_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::MiniMalformedRow | ExecutorErrorCode::MiniStorageFailed => {
                Severity::Fatal
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with context
#[derive(Debug)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    /// Relation the failure is attributed to, if any
    relation: Option<String>,
}

impl ExecutorError {
    /// Create an execution failed error
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::MiniExecutionFailed,
            message: reason.into(),
            relation: None,
        }
    }

    /// Create a malformed row error (FATAL)
    pub fn malformed_row(relation: &str, line: usize, reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::MiniMalformedRow,
            message: format!(
                "Malformed row in relation '{}' at line {}: {}",
                relation,
                line,
                reason.into()
            ),
            relation: Some(relation.to_string()),
        }
    }

    /// Create an aggregate overflow error
    pub fn aggregate_overflow(relation: &str) -> Self {
        Self {
            code: ExecutorErrorCode::MiniAggregateOverflow,
            message: format!("SUM for '{}' overflowed a 64-bit integer", relation),
            relation: Some(relation.to_string()),
        }
    }

    /// Create an output failure error
    pub fn output_failed(source: io::Error) -> Self {
        Self {
            code: ExecutorErrorCode::MiniOutputFailed,
            message: format!("Failed to write result: {}", source),
            relation: None,
        }
    }

    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

impl From<StorageError> for ExecutorError {
    fn from(e: StorageError) -> Self {
        Self {
            code: ExecutorErrorCode::MiniStorageFailed,
            message: e.to_string(),
            relation: None,
        }
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
