//! Catalog loaded from the database directory at startup
//!
//! Layout:
//! - `<db_dir>/schema.txt`: one relation per line, `<name> <type> <type> ...`
//! - `<db_dir>/files/<name>.csv`: the relation's rows

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{CatalogError, CatalogResult};
use super::types::ColumnType;

/// Schema file name inside the database directory
pub const SCHEMA_FILE: &str = "schema.txt";

/// Directory holding one data file per relation
pub const FILES_DIR: &str = "files";

/// Read-only mapping from relation name to column types and data location.
///
/// Built once per process and shared by reference with every scan.
#[derive(Debug, Clone)]
pub struct Catalog {
    db_dir: PathBuf,
    relations: HashMap<String, Vec<ColumnType>>,
}

impl Catalog {
    /// Creates an empty catalog rooted at `db_dir`.
    pub fn new(db_dir: &Path) -> Self {
        Self {
            db_dir: db_dir.to_path_buf(),
            relations: HashMap::new(),
        }
    }

    /// Loads `<db_dir>/schema.txt`.
    ///
    /// A missing or malformed schema file is fatal.
    pub fn load(db_dir: &Path) -> CatalogResult<Self> {
        let path = db_dir.join(SCHEMA_FILE);
        let content = fs::read_to_string(&path)
            .map_err(|e| CatalogError::unreadable(path.display(), e))?;

        let mut catalog = Self::new(db_dir);
        catalog.load_schema_text(&content)?;
        Ok(catalog)
    }

    fn load_schema_text(&mut self, content: &str) -> CatalogResult<()> {
        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let mut parts = line.split_whitespace();
            let name = match parts.next() {
                Some(name) => name,
                None => continue,
            };

            let types = parts
                .map(|t| t.parse::<ColumnType>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CatalogError::malformed(line_no, e))?;

            if types.is_empty() {
                return Err(CatalogError::malformed(
                    line_no,
                    format!("relation '{}' declares no columns", name),
                ));
            }
            if self.relations.contains_key(name) {
                return Err(CatalogError::malformed(
                    line_no,
                    format!("relation '{}' declared twice", name),
                ));
            }

            self.relations.insert(name.to_string(), types);
        }

        Ok(())
    }

    /// Registers a relation directly (for tests or programmatic setup).
    pub fn register(&mut self, name: impl Into<String>, types: Vec<ColumnType>) {
        self.relations.insert(name.into(), types);
    }

    /// Returns the column types of a relation.
    pub fn schema(&self, name: &str) -> CatalogResult<&[ColumnType]> {
        self.relations
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CatalogError::unknown_relation(name))
    }

    /// Returns the data file location of a relation.
    ///
    /// The path is derived from the name; it is not checked for existence.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.db_dir.join(FILES_DIR).join(format!("{}.csv", name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }
}
