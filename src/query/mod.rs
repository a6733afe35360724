//! Query language for minibase
//!
//! A query is a single conjunctive rule:
//!
//! ```text
//! Q(x, SUM(y * z)) :- R(x, y), S(y, z, 'tag'), x < 10
//! ```
//!
//! The parser produces an immutable [`Query`]; the planner never mutates it
//! and works on copies of its atoms instead.

mod ast;
mod parser;

pub use ast::{
    Atom, ComparisonAtom, ComparisonOp, Head, Query, RelationalAtom, SumAggregate, Term,
};
pub use parser::{parse_query, parse_query_file, ParseError};
