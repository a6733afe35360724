//! Projection with duplicate elimination

use std::collections::HashSet;

use crate::query::Term;

use super::errors::ExecutorResult;
use super::operator::{BoxedOperator, Operator};
use super::tuple::{format_schema, position_of, Label, Tuple};

/// Reorders child columns into the output variable order and drops
/// duplicate output tuples.
///
/// The set of already-emitted tuples survives `reset()`, so a reset
/// projection only emits tuples it has not emitted before.
pub struct Project<'a> {
    child: BoxedOperator<'a>,
    relation: String,
    /// Child position for each output column
    positions: Vec<usize>,
    schema: Vec<Label>,
    seen: HashSet<Vec<Term>>,
}

impl<'a> Project<'a> {
    /// Projects onto `variables`; names absent from the child schema are
    /// dropped from the output.
    pub fn new(child: BoxedOperator<'a>, relation: impl Into<String>, variables: &[String]) -> Self {
        let mut positions = Vec::with_capacity(variables.len());
        let mut schema = Vec::with_capacity(variables.len());
        for name in variables {
            if let Some(pos) = position_of(child.schema(), name) {
                positions.push(pos);
                schema.push(Label::var(name.as_str()));
            }
        }

        Self {
            child,
            relation: relation.into(),
            positions,
            schema,
            seen: HashSet::new(),
        }
    }

    /// Number of distinct tuples emitted so far.
    pub fn emitted(&self) -> usize {
        self.seen.len()
    }
}

impl Operator for Project<'_> {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            let values: Vec<Term> = self
                .positions
                .iter()
                .map(|&pos| tuple.values[pos].clone())
                .collect();

            if !self.seen.contains(&values) {
                self.seen.insert(values.clone());
                return Ok(Some(Tuple::new(self.relation.clone(), values)));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.child.reset()
    }

    fn schema(&self) -> &[Label] {
        &self.schema
    }

    fn name(&self) -> &'static str {
        "Project"
    }

    fn detail(&self) -> String {
        format_schema(&self.schema)
    }

    fn children(&self) -> Vec<&dyn Operator> {
        vec![self.child.as_ref()]
    }
}
