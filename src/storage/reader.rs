//! Line-oriented reader over one relation data file
//!
//! Each non-blank line is one record; fields are separated by `", "` and
//! string fields may be wrapped in single quotes, which are stripped.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};

/// Field separator inside a record line
pub const FIELD_SEPARATOR: &str = ", ";

/// One raw record: untyped fields plus its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Forward-only reader that can be rewound by reopening the file.
pub struct RelationReader {
    path: PathBuf,
    reader: BufReader<File>,
    /// Lines consumed so far (including blank lines)
    line_no: usize,
    buf: String,
}

impl RelationReader {
    /// Opens the data file for reading.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            reader: Self::open_file(path)?,
            line_no: 0,
            buf: String::new(),
        })
    }

    fn open_file(path: &Path) -> StorageResult<BufReader<File>> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::file_missing(path.display())
            } else {
                StorageError::read_failed(
                    format!("Failed to open data file: {}", path.display()),
                    e,
                )
            }
        })?;
        Ok(BufReader::new(file))
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at end of file. Blank lines are skipped.
    pub fn read_record(&mut self) -> StorageResult<Option<RawRecord>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf).map_err(|e| {
                StorageError::read_failed(
                    format!(
                        "Failed to read line {} of {}",
                        self.line_no + 1,
                        self.path.display()
                    ),
                    e,
                )
            })?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            return Ok(Some(RawRecord {
                line: self.line_no,
                fields: split_fields(line),
            }));
        }
    }

    /// Reopens the file so the next read starts from the first record.
    pub fn rewind(&mut self) -> StorageResult<()> {
        self.reader = Self::open_file(&self.path)?;
        self.line_no = 0;
        Ok(())
    }
}

/// Splits a record line into unquoted fields.
pub fn split_fields(line: &str) -> Vec<String> {
    line.split(FIELD_SEPARATOR)
        .map(|field| strip_quotes(field.trim()).to_string())
        .collect()
}

fn strip_quotes(field: &str) -> &str {
    if field.len() >= 2 && field.starts_with('\'') && field.ends_with('\'') {
        &field[1..field.len() - 1]
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_fields_strips_quotes() {
        assert_eq!(
            split_fields("1, 'adbs', plain, ''"),
            vec!["1", "adbs", "plain", ""]
        );
    }

    #[test]
    fn test_read_and_rewind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("R.csv");
        fs::write(&path, "1, 2\n\n3, 'x'\r\n").unwrap();

        let mut reader = RelationReader::open(&path).unwrap();
        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.fields, vec!["1", "2"]);
        assert_eq!(first.line, 1);

        let second = reader.read_record().unwrap().unwrap();
        assert_eq!(second.fields, vec!["3", "x"]);
        assert_eq!(second.line, 3);

        assert!(reader.read_record().unwrap().is_none());
        assert!(reader.read_record().unwrap().is_none());

        reader.rewind().unwrap();
        assert_eq!(reader.read_record().unwrap().unwrap(), first);
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = RelationReader::open(&tmp.path().join("nope.csv"))
            .err()
            .unwrap();
        assert_eq!(err.code(), StorageErrorCode::MiniDataFileMissing);
    }
}
