//! Storage error types
//!
//! Error codes:
//! - MINI_DATA_FILE_MISSING (FATAL)
//! - MINI_DATA_READ_FAILED (FATAL)
//!
//! Relation files are the only storage; any failure to read one aborts the
//! evaluation.

use std::fmt;
use std::io;

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Relation data file does not exist
    MiniDataFileMissing,
    /// Relation data file could not be read
    MiniDataReadFailed,
}

impl StorageErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::MiniDataFileMissing => "MINI_DATA_FILE_MISSING",
            StorageErrorCode::MiniDataReadFailed => "MINI_DATA_READ_FAILED",
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with the underlying I/O error attached
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl StorageError {
    /// Data file not found
    pub fn file_missing(path: impl fmt::Display) -> Self {
        Self {
            code: StorageErrorCode::MiniDataFileMissing,
            message: format!("Data file not found: {}", path),
            source: None,
        }
    }

    /// Data file open or read failed
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::MiniDataReadFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StorageErrorCode::MiniDataFileMissing.code(),
            "MINI_DATA_FILE_MISSING"
        );
        assert_eq!(
            StorageErrorCode::MiniDataReadFailed.code(),
            "MINI_DATA_READ_FAILED"
        );
    }

    #[test]
    fn test_display_includes_source() {
        let err = StorageError::read_failed(
            "Failed to read R.csv",
            io::Error::new(io::ErrorKind::Other, "disk gone"),
        );
        let display = err.to_string();
        assert!(display.contains("MINI_DATA_READ_FAILED"));
        assert!(display.contains("disk gone"));
    }
}
