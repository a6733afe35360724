//! Relation storage for minibase
//!
//! One delimited text file per relation under `<db_dir>/files/`. Files are
//! only ever read sequentially from the start; there are no indexes and no
//! writes.

mod errors;
mod reader;

pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use reader::{split_fields, RawRecord, RelationReader, FIELD_SEPARATOR};
