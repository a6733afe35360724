//! Conjunctive query AST
//!
//! Produced once by the parser and consumed read-only by the planner.

use std::fmt;

/// A variable or a typed constant.
///
/// Tuple values are always constants; variables only appear inside query
/// atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Named variable
    Variable(String),
    /// Integer constant
    Integer(i64),
    /// String constant (stored unquoted)
    String(String),
}

impl Term {
    /// Creates a variable term
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Creates a string constant term
    pub fn string(value: impl Into<String>) -> Self {
        Term::String(value.into())
    }

    /// Returns the variable name, if this is a variable
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer constant
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Term::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns true for integer and string constants
    pub fn is_constant(&self) -> bool {
        !matches!(self, Term::Variable(_))
    }

    /// Renders the term in query syntax (strings quoted).
    pub fn to_query_string(&self) -> String {
        match self {
            Term::String(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }
}

/// Output rendering: integers in decimal, strings unquoted.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "{}", name),
            Term::Integer(v) => write!(f, "{}", v),
            Term::String(s) => write!(f, "{}", s),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    /// Returns the operator symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }

    /// Returns true for `<`, `<=`, `>` and `>=`
    pub fn is_ordering(&self) -> bool {
        !matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `R(t1, ..., tn)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalAtom {
    pub name: String,
    pub terms: Vec<Term>,
}

impl RelationalAtom {
    pub fn new(name: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            name: name.into(),
            terms,
        }
    }

    /// Variable names in argument order (duplicates kept)
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(Term::as_variable)
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v == name)
    }
}

impl fmt::Display for RelationalAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(Term::to_query_string).collect();
        write!(f, "{}({})", self.name, terms.join(", "))
    }
}

/// `t1 op t2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonAtom {
    pub left: Term,
    pub op: ComparisonOp,
    pub right: Term,
}

impl ComparisonAtom {
    pub fn new(left: Term, op: ComparisonOp, right: Term) -> Self {
        Self { left, op, right }
    }

    /// Variables referenced by either side (at most two)
    pub fn variables(&self) -> Vec<&str> {
        let mut vars = Vec::with_capacity(2);
        for term in [&self.left, &self.right] {
            if let Some(name) = term.as_variable() {
                if !vars.contains(&name) {
                    vars.push(name);
                }
            }
        }
        vars
    }
}

impl fmt::Display for ComparisonAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.left.to_query_string(),
            self.op,
            self.right.to_query_string()
        )
    }
}

/// A body atom
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Relational(RelationalAtom),
    Comparison(ComparisonAtom),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Relational(atom) => atom.fmt(f),
            Atom::Comparison(atom) => atom.fmt(f),
        }
    }
}

/// `SUM(t1 * t2 * ...)`: per-row product of the operands, summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumAggregate {
    pub terms: Vec<Term>,
}

impl SumAggregate {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }
}

impl fmt::Display for SumAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(Term::to_query_string).collect();
        write!(f, "SUM({})", terms.join(" * "))
    }
}

/// Query head: output name, projection/group-by variables, optional SUM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    pub name: String,
    pub variables: Vec<String>,
    pub aggregate: Option<SumAggregate>,
}

impl Head {
    pub fn new(name: impl Into<String>, variables: Vec<String>) -> Self {
        Self {
            name: name.into(),
            variables,
            aggregate: None,
        }
    }

    pub fn with_aggregate(mut self, aggregate: SumAggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.variables.clone();
        if let Some(agg) = &self.aggregate {
            parts.push(agg.to_string());
        }
        write!(f, "{}({})", self.name, parts.join(", "))
    }
}

/// A parsed conjunctive query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub head: Head,
    pub body: Vec<Atom>,
}

impl Query {
    pub fn new(head: Head, body: Vec<Atom>) -> Self {
        Self { head, body }
    }

    /// Relational atoms in body order
    pub fn relational_atoms(&self) -> impl Iterator<Item = &RelationalAtom> {
        self.body.iter().filter_map(|atom| match atom {
            Atom::Relational(r) => Some(r),
            Atom::Comparison(_) => None,
        })
    }

    /// Comparison atoms in body order
    pub fn comparison_atoms(&self) -> impl Iterator<Item = &ComparisonAtom> {
        self.body.iter().filter_map(|atom| match atom {
            Atom::Comparison(c) => Some(c),
            Atom::Relational(_) => None,
        })
    }

    pub fn has_aggregate(&self) -> bool {
        self.head.aggregate.is_some()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: Vec<String> = self.body.iter().map(ToString::to_string).collect();
        write!(f, "{} :- {}", self.head, body.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_output_rendering() {
        assert_eq!(Term::Integer(-4).to_string(), "-4");
        assert_eq!(Term::string("adbs").to_string(), "adbs");
        assert_eq!(Term::string("adbs").to_query_string(), "'adbs'");
    }

    #[test]
    fn test_comparison_variables_deduplicated() {
        let atom = ComparisonAtom::new(Term::var("x"), ComparisonOp::Eq, Term::var("x"));
        assert_eq!(atom.variables(), vec!["x"]);

        let atom = ComparisonAtom::new(Term::var("x"), ComparisonOp::Lt, Term::Integer(3));
        assert_eq!(atom.variables(), vec!["x"]);
    }

    #[test]
    fn test_query_display() {
        let query = Query::new(
            Head::new("Q", vec!["x".into()]).with_aggregate(SumAggregate::new(vec![
                Term::var("y"),
                Term::Integer(2),
            ])),
            vec![
                Atom::Relational(RelationalAtom::new(
                    "R",
                    vec![Term::var("x"), Term::var("y"), Term::string("a")],
                )),
                Atom::Comparison(ComparisonAtom::new(
                    Term::var("x"),
                    ComparisonOp::Ge,
                    Term::Integer(1),
                )),
            ],
        );
        assert_eq!(
            query.to_string(),
            "Q(x, SUM(y * 2)) :- R(x, y, 'a'), x >= 1"
        );
    }
}
