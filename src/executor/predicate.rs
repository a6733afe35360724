//! Comparison evaluation for selections and joins
//!
//! Predicates are bound once, at operator construction, to column positions
//! in the operator's working schema. Per-tuple evaluation is then a pair of
//! slice lookups and one comparison.
//!
//! No type coercion: `=` and `!=` are structural, ordering operators only
//! hold between two integers or two strings. Anything else is false.

use std::cmp::Ordering;
use std::fmt;

use crate::query::{ComparisonAtom, ComparisonOp, Term};

/// Evaluates `left op right`.
pub fn compare(op: ComparisonOp, left: &Term, right: &Term) -> bool {
    match op {
        ComparisonOp::Eq => left == right,
        ComparisonOp::Ne => left != right,
        _ => match (left, right) {
            (Term::Integer(a), Term::Integer(b)) => ordering_holds(op, a.cmp(b)),
            (Term::String(a), Term::String(b)) => ordering_holds(op, a.cmp(b)),
            // Variables never reach evaluation; mixed types do not order
            _ => false,
        },
    }
}

fn ordering_holds(op: ComparisonOp, ordering: Ordering) -> bool {
    match op {
        ComparisonOp::Eq => ordering.is_eq(),
        ComparisonOp::Ne => ordering.is_ne(),
        ComparisonOp::Lt => ordering.is_lt(),
        ComparisonOp::Le => ordering.is_le(),
        ComparisonOp::Gt => ordering.is_gt(),
        ComparisonOp::Ge => ordering.is_ge(),
    }
}

/// One side of a bound comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Value at this position of the (concatenated) tuple
    Column(usize),
    /// Literal from the query text
    Constant(Term),
    /// Variable with no column in scope; the predicate can never hold
    Unresolved(String),
}

impl Operand {
    /// Binds a query term using `resolve` to look up variables.
    pub fn bind(term: &Term, resolve: impl Fn(&str) -> Option<usize>) -> Self {
        match term {
            Term::Variable(name) => match resolve(name) {
                Some(pos) => Operand::Column(pos),
                None => Operand::Unresolved(name.clone()),
            },
            constant => Operand::Constant(constant.clone()),
        }
    }

    /// Looks the operand up in a tuple split across two slices.
    ///
    /// Positions index `left ++ right` without materializing it.
    pub fn resolve<'t>(&'t self, left: &'t [Term], right: &'t [Term]) -> Option<&'t Term> {
        match self {
            Operand::Column(pos) if *pos < left.len() => left.get(*pos),
            Operand::Column(pos) => right.get(*pos - left.len()),
            Operand::Constant(term) => Some(term),
            Operand::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Operand::Unresolved(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(pos) => write!(f, "${}", pos),
            Operand::Constant(term) => write!(f, "{}", term.to_query_string()),
            Operand::Unresolved(name) => write!(f, "?{}", name),
        }
    }
}

/// A comparison whose variables have been mapped to column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPredicate {
    left: Operand,
    op: ComparisonOp,
    right: Operand,
}

impl BoundPredicate {
    /// Binds a comparison atom against a schema through `resolve`.
    pub fn bind(atom: &ComparisonAtom, resolve: impl Fn(&str) -> Option<usize>) -> Self {
        Self {
            left: Operand::bind(&atom.left, &resolve),
            op: atom.op,
            right: Operand::bind(&atom.right, &resolve),
        }
    }

    /// `$left = $right` over two columns.
    pub fn column_equality(left: usize, right: usize) -> Self {
        Self {
            left: Operand::Column(left),
            op: ComparisonOp::Eq,
            right: Operand::Column(right),
        }
    }

    /// True when neither side is unresolved.
    pub fn is_resolved(&self) -> bool {
        self.left.is_resolved() && self.right.is_resolved()
    }

    /// Evaluates against one tuple.
    pub fn evaluate(&self, values: &[Term]) -> bool {
        self.evaluate_split(values, &[])
    }

    /// Evaluates against the concatenation `left ++ right`.
    pub fn evaluate_split(&self, left: &[Term], right: &[Term]) -> bool {
        match (
            self.left.resolve(left, right),
            self.right.resolve(left, right),
        ) {
            (Some(l), Some(r)) => compare(self.op, l, r),
            _ => false,
        }
    }
}

impl fmt::Display for BoundPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op.as_str(), self.right)
    }
}

/// Conjunction over all predicates (empty is true).
pub fn all_hold(predicates: &[BoundPredicate], left: &[Term], right: &[Term]) -> bool {
    predicates.iter().all(|p| p.evaluate_split(left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Term {
        Term::Integer(v)
    }

    #[test]
    fn test_equality_is_structural() {
        assert!(compare(ComparisonOp::Eq, &int(1), &int(1)));
        assert!(!compare(ComparisonOp::Eq, &int(1), &Term::string("1")));
        assert!(compare(ComparisonOp::Ne, &int(1), &Term::string("1")));
    }

    #[test]
    fn test_ordering_requires_same_type() {
        assert!(compare(ComparisonOp::Lt, &int(1), &int(2)));
        assert!(compare(ComparisonOp::Ge, &int(2), &int(2)));
        assert!(compare(
            ComparisonOp::Lt,
            &Term::string("abc"),
            &Term::string("abd")
        ));
        assert!(!compare(ComparisonOp::Lt, &int(1), &Term::string("z")));
        assert!(!compare(ComparisonOp::Gt, &Term::string("z"), &int(1)));
    }

    #[test]
    fn test_bind_and_evaluate() {
        let atom = ComparisonAtom::new(Term::var("y"), ComparisonOp::Gt, int(5));
        let pred = BoundPredicate::bind(&atom, |name| (name == "y").then_some(1));
        assert!(pred.is_resolved());
        assert!(pred.evaluate(&[int(0), int(9)]));
        assert!(!pred.evaluate(&[int(0), int(3)]));
        assert_eq!(pred.to_string(), "$1 > 5");
    }

    #[test]
    fn test_unresolved_is_false() {
        let atom = ComparisonAtom::new(Term::var("q"), ComparisonOp::Ne, int(5));
        let pred = BoundPredicate::bind(&atom, |_| None);
        assert!(!pred.is_resolved());
        assert!(!pred.evaluate(&[int(1)]));
    }

    #[test]
    fn test_split_evaluation() {
        let pred = BoundPredicate::column_equality(2, 0);
        let left = [int(7), int(1)];
        assert!(all_hold(&[pred.clone()], &left, &[int(7)]));
        assert!(!all_hold(&[pred], &left, &[int(8)]));
        assert!(all_hold(&[], &left, &[]));
    }
}
