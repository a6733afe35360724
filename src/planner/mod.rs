//! Query planner subsystem for minibase
//!
//! Builds a left-deep operator tree from a parsed query.
//!
//! # Design Principles
//!
//! - Deterministic: same query and catalog produce the same tree
//! - Push-down: selections sit directly above the scan they filter
//! - Narrow: without an aggregate, intermediate results keep only the
//!   columns still needed downstream
//! - Scoped naming: fresh variables and join aliases come from a
//!   per-build [`PlanningContext`]
//!
//! # Attachment rules
//!
//! 1. Selection: every variable occurs in the scanned atom
//! 2. Join: touches both sides of the merge and every variable is bound by
//!    one of them; each comparison is attached at most once
//!
//! A comparison that matches neither rule is dropped and reported with a
//! `PREDICATE_UNATTACHED` warning.

mod context;
mod errors;
mod explain;
mod planner;

pub use context::PlanningContext;
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::{ExplainNode, ExplainPlan};
pub use planner::{
    classify, necessary_variables, normalize, PlanOptions, PredicateKind, QueryPlan,
    QueryPlanner,
};
