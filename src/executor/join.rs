//! Nested-loop join with implicit equalities for shared variables

use crate::query::ComparisonAtom;

use super::errors::ExecutorResult;
use super::operator::{BoxedOperator, LabelAllocator, Operator};
use super::predicate::{all_hold, BoundPredicate};
use super::tuple::{format_schema, position_of, Label, Tuple};

/// Pairs every left tuple with every right tuple and keeps the pairs that
/// satisfy the join predicates.
///
/// A right column whose label also appears in the left schema is renamed to
/// a fresh alias, and an implicit `alias = left column` equality is added.
/// The output schema is `left ++ renamed right`.
///
/// Output order is left-major: for each left tuple, all matching right
/// tuples in right order. The right child is reset once per left tuple.
pub struct Join<'a> {
    left: BoxedOperator<'a>,
    right: BoxedOperator<'a>,
    schema: Vec<Label>,
    predicates: Vec<BoundPredicate>,
    /// Number of implicit equalities at the front of `predicates`
    implicit: usize,
    left_current: Option<Tuple>,
    right_current: Option<Tuple>,
}

impl<'a> Join<'a> {
    /// Builds the join and pulls the first tuple from each side.
    ///
    /// Variables of `predicates` resolve against the left schema, then the
    /// renamed right schema, then the right schema before renaming.
    pub fn new(
        mut left: BoxedOperator<'a>,
        mut right: BoxedOperator<'a>,
        predicates: &[ComparisonAtom],
        aliases: &mut dyn LabelAllocator,
    ) -> ExecutorResult<Self> {
        let left_schema = left.schema().to_vec();
        let right_original = right.schema().to_vec();
        let left_width = left_schema.len();

        let mut right_schema = right_original.clone();
        let mut bound = Vec::new();
        for (left_pos, label) in left_schema.iter().enumerate() {
            if label.variable_name().is_none() {
                continue;
            }
            for (right_pos, right_label) in right_schema.iter_mut().enumerate() {
                if right_label == label {
                    *right_label = aliases.fresh_alias();
                    bound.push(BoundPredicate::column_equality(
                        left_width + right_pos,
                        left_pos,
                    ));
                }
            }
        }
        let implicit = bound.len();

        for atom in predicates {
            bound.push(BoundPredicate::bind(atom, |name| {
                position_of(&left_schema, name)
                    .or_else(|| position_of(&right_schema, name).map(|p| left_width + p))
                    .or_else(|| position_of(&right_original, name).map(|p| left_width + p))
            }));
        }

        let mut schema = left_schema;
        schema.extend(right_schema);

        let left_current = left.next()?;
        let right_current = right.next()?;

        Ok(Self {
            left,
            right,
            schema,
            predicates: bound,
            implicit,
            left_current,
            right_current,
        })
    }

    /// All predicates, implicit equalities first.
    pub fn predicates(&self) -> &[BoundPredicate] {
        &self.predicates
    }

    /// Number of shared-variable equalities added during construction.
    pub fn implicit_count(&self) -> usize {
        self.implicit
    }

    /// Moves to the next (left, right) pair.
    fn advance(&mut self) -> ExecutorResult<()> {
        self.right_current = self.right.next()?;
        if self.right_current.is_none() {
            self.right.reset()?;
            self.right_current = self.right.next()?;
            self.left_current = self.left.next()?;
        }
        Ok(())
    }
}

impl Operator for Join<'_> {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        loop {
            let candidate = match (&self.left_current, &self.right_current) {
                (Some(l), Some(r)) => {
                    if all_hold(&self.predicates, &l.values, &r.values) {
                        Some(Tuple::joined(l, r))
                    } else {
                        None
                    }
                }
                _ => return Ok(None),
            };

            self.advance()?;

            if candidate.is_some() {
                return Ok(candidate);
            }
        }
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.left.reset()?;
        self.right.reset()?;
        self.left_current = self.left.next()?;
        self.right_current = self.right.next()?;
        Ok(())
    }

    fn schema(&self) -> &[Label] {
        &self.schema
    }

    fn name(&self) -> &'static str {
        "Join"
    }

    fn detail(&self) -> String {
        let predicates: Vec<String> = self.predicates.iter().map(ToString::to_string).collect();
        if predicates.is_empty() {
            format!("cross {}", format_schema(&self.schema))
        } else {
            format!("{} ON {}", format_schema(&self.schema), predicates.join(" AND "))
        }
    }

    fn children(&self) -> Vec<&dyn Operator> {
        vec![self.left.as_ref(), self.right.as_ref()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::{drain, Values};
    use crate::executor::AliasCounter;
    use crate::query::{ComparisonOp, Term};

    #[test]
    fn test_cross_product_is_left_major() {
        let left = Values::ints(&["a"], &[&[1], &[2]]);
        let right = Values::ints(&["b"], &[&[10], &[20]]);
        let mut join = Join::new(
            Box::new(left),
            Box::new(right),
            &[],
            &mut AliasCounter::new(),
        )
        .unwrap();
        assert_eq!(
            drain(&mut join),
            vec!["1, 10", "1, 20", "2, 10", "2, 20"]
        );
    }

    #[test]
    fn test_shared_variable_becomes_alias() {
        let left = Values::ints(&["x", "y"], &[&[1, 2], &[1, 3]]);
        let right = Values::ints(&["y", "z"], &[&[2, 7], &[3, 8], &[2, 9]]);
        let mut aliases = AliasCounter::new();
        let mut join = Join::new(Box::new(left), Box::new(right), &[], &mut aliases).unwrap();

        assert_eq!(
            join.schema(),
            &[
                Label::var("x"),
                Label::var("y"),
                Label::Alias(0),
                Label::var("z")
            ]
        );
        assert_eq!(join.implicit_count(), 1);
        assert_eq!(drain(&mut join), vec!["1, 2, 2, 7", "1, 2, 2, 9", "1, 3, 3, 8"]);
    }

    #[test]
    fn test_explicit_predicate_across_sides() {
        let left = Values::ints(&["a"], &[&[1], &[5]]);
        let right = Values::ints(&["b"], &[&[3], &[4]]);
        let pred = ComparisonAtom::new(Term::var("a"), ComparisonOp::Lt, Term::var("b"));
        let mut join = Join::new(
            Box::new(left),
            Box::new(right),
            &[pred],
            &mut AliasCounter::new(),
        )
        .unwrap();
        assert_eq!(drain(&mut join), vec!["1, 3", "1, 4"]);
    }

    #[test]
    fn test_predicate_resolves_renamed_right_name() {
        // `y` is renamed on the right but still resolves to the left column
        let left = Values::ints(&["y"], &[&[1], &[2]]);
        let right = Values::ints(&["y", "w"], &[&[1, 100], &[2, 200]]);
        let pred = ComparisonAtom::new(Term::var("y"), ComparisonOp::Gt, Term::Integer(1));
        let mut join = Join::new(
            Box::new(left),
            Box::new(right),
            &[pred],
            &mut AliasCounter::new(),
        )
        .unwrap();
        assert_eq!(drain(&mut join), vec!["2, 2, 200"]);
    }

    #[test]
    fn test_empty_side_yields_nothing() {
        let left = Values::ints(&["a"], &[&[1]]);
        let right = Values::ints(&["b"], &[]);
        let mut join = Join::new(
            Box::new(left),
            Box::new(right),
            &[],
            &mut AliasCounter::new(),
        )
        .unwrap();
        assert!(drain(&mut join).is_empty());
        assert!(join.next().unwrap().is_none());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let left = Values::ints(&["x"], &[&[1], &[2]]);
        let right = Values::ints(&["x"], &[&[2], &[1], &[2]]);
        let mut join = Join::new(
            Box::new(left),
            Box::new(right),
            &[],
            &mut AliasCounter::new(),
        )
        .unwrap();
        let first = drain(&mut join);
        assert_eq!(first, vec!["1, 1", "2, 2", "2, 2"]);

        join.reset().unwrap();
        join.reset().unwrap();
        assert_eq!(drain(&mut join), first);
    }
}
