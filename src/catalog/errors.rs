//! Catalog error types
//!
//! Error codes:
//! - MINI_CATALOG_UNREADABLE
//! - MINI_CATALOG_MALFORMED
//! - MINI_UNKNOWN_RELATION
//!
//! Every catalog error is a configuration error and aborts evaluation.

use std::fmt;

/// Catalog-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Schema file missing or unreadable
    MiniCatalogUnreadable,
    /// Schema file line could not be understood
    MiniCatalogMalformed,
    /// Relation name not declared in the schema file
    MiniUnknownRelation,
}

impl CatalogErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogErrorCode::MiniCatalogUnreadable => "MINI_CATALOG_UNREADABLE",
            CatalogErrorCode::MiniCatalogMalformed => "MINI_CATALOG_MALFORMED",
            CatalogErrorCode::MiniUnknownRelation => "MINI_UNKNOWN_RELATION",
        }
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog error with context
#[derive(Debug)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
    /// 1-based schema file line, if applicable
    line: Option<usize>,
}

impl CatalogError {
    /// Schema file could not be read
    pub fn unreadable(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self {
            code: CatalogErrorCode::MiniCatalogUnreadable,
            message: format!("Failed to read schema file {}: {}", path, reason),
            line: None,
        }
    }

    /// Schema file line is malformed
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self {
            code: CatalogErrorCode::MiniCatalogMalformed,
            message: format!("Malformed schema at line {}: {}", line, reason.into()),
            line: Some(line),
        }
    }

    /// Relation not present in the catalog
    pub fn unknown_relation(name: &str) -> Self {
        Self {
            code: CatalogErrorCode::MiniUnknownRelation,
            message: format!("Relation '{}' is not declared in the schema", name),
            line: None,
        }
    }

    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code, self.message)
    }
}

impl std::error::Error for CatalogError {}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::malformed(3, "unknown column type 'float'");
        let display = err.to_string();
        assert!(display.contains("MINI_CATALOG_MALFORMED"));
        assert!(display.contains("line 3"));
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_unknown_relation_code() {
        let err = CatalogError::unknown_relation("T");
        assert_eq!(err.code(), CatalogErrorCode::MiniUnknownRelation);
        assert!(err.message().contains("'T'"));
    }
}
