//! Catalog subsystem for minibase
//!
//! Resolves relation names to column types and data file locations.
//!
//! # Design Principles
//!
//! - Loaded once at startup, read-only afterwards
//! - Passed by reference, never a process-wide singleton
//! - Missing or malformed schema files abort evaluation

mod errors;
mod loader;
mod types;

pub use errors::{CatalogError, CatalogErrorCode, CatalogResult};
pub use loader::{Catalog, FILES_DIR, SCHEMA_FILE};
pub use types::ColumnType;
