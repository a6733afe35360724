//! Tuples and the schema labels that name their positions

use std::fmt;

use crate::query::Term;

/// Name of one tuple position.
///
/// Every operator's schema is a `Vec<Label>` positionally aligned with the
/// values of the tuples it emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// Column bound to a query variable
    Variable(String),
    /// Column holding a literal that is never looked up by name
    Constant,
    /// Right-hand column renamed by a join to avoid a name collision
    Alias(usize),
    /// SUM output column
    Aggregate,
}

impl Label {
    pub fn var(name: impl Into<String>) -> Self {
        Label::Variable(name.into())
    }

    /// Returns the variable name for `Variable` labels
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Label::Variable(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Variable(name) => write!(f, "{}", name),
            Label::Constant => write!(f, "<const>"),
            Label::Alias(n) => write!(f, "#{}", n),
            Label::Aggregate => write!(f, "SUM"),
        }
    }
}

/// Position of the first column bound to `name`.
pub fn position_of(schema: &[Label], name: &str) -> Option<usize> {
    schema
        .iter()
        .position(|label| label.variable_name() == Some(name))
}

/// Renders a schema as `[x, y, #0]`.
pub fn format_schema(schema: &[Label]) -> String {
    let labels: Vec<String> = schema.iter().map(ToString::to_string).collect();
    format!("[{}]", labels.join(", "))
}

/// One row flowing between operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    /// Provenance, informational only
    pub relation: String,
    pub values: Vec<Term>,
}

impl Tuple {
    pub fn new(relation: impl Into<String>, values: Vec<Term>) -> Self {
        Self {
            relation: relation.into(),
            values,
        }
    }

    /// Concatenates two tuples (left values first).
    pub fn joined(left: &Tuple, right: &Tuple) -> Self {
        let mut values = Vec::with_capacity(left.values.len() + right.values.len());
        values.extend_from_slice(&left.values);
        values.extend_from_slice(&right.values);
        Self {
            relation: format!("{} + {}", left.relation, right.relation),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Output line format: values joined by `", "`.
impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_display() {
        let tuple = Tuple::new("R", vec![Term::Integer(1), Term::string("adbs")]);
        assert_eq!(tuple.to_string(), "1, adbs");
        assert_eq!(Tuple::new("R", vec![]).to_string(), "");
    }

    #[test]
    fn test_joined_tuple() {
        let left = Tuple::new("R", vec![Term::Integer(1)]);
        let right = Tuple::new("S", vec![Term::Integer(2), Term::Integer(3)]);
        let joined = Tuple::joined(&left, &right);
        assert_eq!(joined.relation, "R + S");
        assert_eq!(joined.len(), 3);
    }

    #[test]
    fn test_position_skips_markers() {
        let schema = vec![Label::Constant, Label::Alias(0), Label::var("x"), Label::var("x")];
        assert_eq!(position_of(&schema, "x"), Some(2));
        assert_eq!(position_of(&schema, "y"), None);
        assert_eq!(format_schema(&schema), "[<const>, #0, x, x]");
    }
}
