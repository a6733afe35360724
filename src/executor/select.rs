//! Selection: filter child tuples by a conjunction of comparisons

use crate::query::ComparisonAtom;

use super::errors::ExecutorResult;
use super::operator::{BoxedOperator, Operator};
use super::predicate::{all_hold, BoundPredicate};
use super::tuple::{position_of, Label, Tuple};

/// Passes through child tuples that satisfy every predicate.
pub struct Select<'a> {
    child: BoxedOperator<'a>,
    predicates: Vec<BoundPredicate>,
    schema: Vec<Label>,
}

impl<'a> Select<'a> {
    /// Binds `predicates` against the child's schema.
    ///
    /// A variable with no column in the child makes its predicate false for
    /// every tuple.
    pub fn new(child: BoxedOperator<'a>, predicates: &[ComparisonAtom]) -> Self {
        let schema = child.schema().to_vec();
        let predicates = predicates
            .iter()
            .map(|atom| BoundPredicate::bind(atom, |name| position_of(&schema, name)))
            .collect();

        Self {
            child,
            predicates,
            schema,
        }
    }

    pub fn predicates(&self) -> &[BoundPredicate] {
        &self.predicates
    }
}

impl Operator for Select<'_> {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            if all_hold(&self.predicates, &tuple.values, &[]) {
                return Ok(Some(tuple));
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
        "Select"
    }

    fn detail(&self) -> String {
        self.predicates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn children(&self) -> Vec<&dyn Operator> {
        vec![self.child.as_ref()]
    }
}
