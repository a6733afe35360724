//! minibase - a small conjunctive-query evaluator
//!
//! Evaluates one Datalog-style rule, optionally with a SUM aggregate,
//! against relations stored as delimited text files.
//!
//! # Subsystems
//!
//! - [`query`]: AST and query-text parser
//! - [`catalog`]: relation schemas and data file locations
//! - [`storage`]: line-oriented relation file reader
//! - [`executor`]: pull-based operators (scan, select, join, project, sum)
//! - [`planner`]: builds the operator tree from a query
//! - [`observability`]: structured JSON logging
//! - [`cli`]: configuration, argument parsing and the evaluation entry point

pub mod catalog;
pub mod cli;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod query;
pub mod storage;
