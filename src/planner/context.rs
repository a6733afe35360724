//! Per-build naming state
//!
//! Every fresh name used while building one plan comes from a single
//! `PlanningContext`, created for that build and dropped with it. Two builds
//! never share counters.

use std::collections::HashSet;

use crate::executor::{AliasCounter, Label, LabelAllocator};
use crate::query::{Atom, Query, Term};

/// Prefix of variables introduced by normalization
const FRESH_PREFIX: &str = "_k";

/// Fresh-name source for one plan build.
#[derive(Debug)]
pub struct PlanningContext {
    /// Variable names already taken by the query text
    taken: HashSet<String>,
    next_variable: usize,
    /// Names handed out by `fresh_variable`
    introduced: usize,
    aliases: AliasCounter,
}

impl PlanningContext {
    /// Creates a context that will never hand out a name used in `query`.
    pub fn new(query: &Query) -> Self {
        let mut taken: HashSet<String> = query.head.variables.iter().cloned().collect();
        for atom in &query.body {
            let terms: Vec<&Term> = match atom {
                Atom::Relational(rel) => rel.terms.iter().collect(),
                Atom::Comparison(cmp) => vec![&cmp.left, &cmp.right],
            };
            for name in terms.into_iter().filter_map(Term::as_variable) {
                taken.insert(name.to_string());
            }
        }
        if let Some(aggregate) = &query.head.aggregate {
            for name in aggregate.terms.iter().filter_map(Term::as_variable) {
                taken.insert(name.to_string());
            }
        }

        Self {
            taken,
            next_variable: 0,
            introduced: 0,
            aliases: AliasCounter::new(),
        }
    }

    /// Returns a variable name not used anywhere in the query or earlier
    /// in this build.
    pub fn fresh_variable(&mut self) -> String {
        loop {
            let name = format!("{}{}", FRESH_PREFIX, self.next_variable);
            self.next_variable += 1;
            if self.taken.insert(name.clone()) {
                self.introduced += 1;
                return name;
            }
        }
    }

    /// Number of variables introduced by normalization so far.
    pub fn fresh_variables(&self) -> usize {
        self.introduced
    }

    /// Number of join aliases handed out so far.
    pub fn aliases(&self) -> usize {
        self.aliases.issued()
    }
}

impl LabelAllocator for PlanningContext {
    fn fresh_alias(&mut self) -> Label {
        self.aliases.fresh_alias()
    }
}
