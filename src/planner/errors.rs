//! Planner error types
//!
//! Error codes:
//! - MINI_QUERY_INVALID (REJECT)
//! - MINI_UNKNOWN_RELATION (REJECT)
//! - MINI_ARITY_MISMATCH (REJECT)
//! - MINI_UNBOUND_VARIABLE (REJECT)
//! - MINI_PLAN_BUILD_FAILED (FATAL)

use std::fmt;

use crate::executor::ExecutorError;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected before any data is read
    Reject,
    /// Operator construction failed (data file unavailable)
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Malformed query structure
    MiniQueryInvalid,
    /// Relation not declared in the catalog
    MiniUnknownRelation,
    /// Atom term count differs from the relation's column count
    MiniArityMismatch,
    /// Head or aggregate variable not bound by any relational atom
    MiniUnboundVariable,
    /// An operator could not be constructed
    MiniPlanBuildFailed,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::MiniQueryInvalid => "MINI_QUERY_INVALID",
            PlannerErrorCode::MiniUnknownRelation => "MINI_UNKNOWN_RELATION",
            PlannerErrorCode::MiniArityMismatch => "MINI_ARITY_MISMATCH",
            PlannerErrorCode::MiniUnboundVariable => "MINI_UNBOUND_VARIABLE",
            PlannerErrorCode::MiniPlanBuildFailed => "MINI_PLAN_BUILD_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            PlannerErrorCode::MiniPlanBuildFailed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Variable or relation name if applicable
    subject: Option<String>,
    /// Underlying operator failure for build errors
    source: Option<ExecutorError>,
}

impl PlannerError {
    /// Create a query invalid error
    pub fn query_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::MiniQueryInvalid,
            message: reason.into(),
            subject: None,
            source: None,
        }
    }

    /// Create an unknown relation error
    pub fn unknown_relation(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: PlannerErrorCode::MiniUnknownRelation,
            message: format!("Relation '{}' is not in the catalog", name),
            subject: Some(name),
            source: None,
        }
    }

    /// Create an arity mismatch error
    pub fn arity_mismatch(name: impl Into<String>, expected: usize, found: usize) -> Self {
        let name = name.into();
        Self {
            code: PlannerErrorCode::MiniArityMismatch,
            message: format!(
                "Relation '{}' has {} columns but the atom has {} terms",
                name, expected, found
            ),
            subject: Some(name),
            source: None,
        }
    }

    /// Create an unbound variable error
    pub fn unbound_variable(variable: impl Into<String>, role: &str) -> Self {
        let variable = variable.into();
        Self {
            code: PlannerErrorCode::MiniUnboundVariable,
            message: format!(
                "{} variable '{}' does not occur in any relational atom",
                role, variable
            ),
            subject: Some(variable),
            source: None,
        }
    }

    /// Wrap an operator construction failure
    pub fn build_failed(source: ExecutorError) -> Self {
        Self {
            code: PlannerErrorCode::MiniPlanBuildFailed,
            message: format!("Failed to build operator: {}", source.message()),
            subject: source.relation().map(str::to_string),
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending variable or relation name if applicable
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<ExecutorError> for PlannerError {
    fn from(e: ExecutorError) -> Self {
        PlannerError::build_failed(e)
    }
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
