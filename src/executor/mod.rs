//! Pull-based query executor for minibase
//!
//! A plan is a tree of [`Operator`]s. The root is driven by repeated
//! `next()` calls; every operator pulls tuples from its children on demand
//! and nothing is materialized except where an operator needs it (the
//! projection's emitted set, the hash aggregation's group table).
//!
//! # Operators
//!
//! - [`Scan`]: every row of one relation file, in file order
//! - [`Select`]: conjunction of comparisons over the child's tuples
//! - [`Join`]: nested loop, left-major order, implicit equalities for
//!   shared variables
//! - [`Project`]: column reordering with duplicate elimination
//! - [`Sum`]: global or grouped SUM of products
//!
//! # Invariants
//!
//! - Every emitted tuple has exactly `schema().len()` values.
//! - Scan, Select and Join replay the same sequence after `reset()`.
//! - Project and Sum never emit the same output twice, even across resets.

mod errors;
mod join;
mod operator;
mod predicate;
mod project;
mod result;
mod scan;
mod select;
mod sum;
mod tuple;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use join::Join;
pub use operator::{AliasCounter, BoxedOperator, LabelAllocator, Operator};
pub use predicate::{compare, BoundPredicate, Operand};
pub use project::Project;
pub use result::{collect_rows, write_rows, ExecutionResult};
pub use scan::Scan;
pub use select::Select;
pub use sum::{AggregationStrategy, Sum};
pub use tuple::{format_schema, position_of, Label, Tuple};
