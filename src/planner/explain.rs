//! Explain plan output
//!
//! Produces deterministic, human-readable rendering of a built operator
//! tree, one operator per line, children indented under their parent.

use std::fmt;

use crate::executor::{format_schema, Operator};

use super::planner::QueryPlan;

/// One operator in the rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainNode {
    /// Nesting depth (root is 0)
    pub depth: usize,
    /// Operator type name
    pub operator: String,
    /// Operator-specific detail
    pub detail: String,
    /// Output schema
    pub schema: String,
}

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Operators in pre-order
    pub nodes: Vec<ExplainNode>,
    /// Comparisons no operator evaluates
    pub unattached: Vec<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a built query plan
    pub fn from_plan(plan: &QueryPlan<'_>) -> Self {
        let mut nodes = Vec::new();
        collect(plan.root(), 0, &mut nodes);

        Self {
            nodes,
            unattached: plan.unattached().iter().map(ToString::to_string).collect(),
        }
    }

    /// Creates an explain plan for any operator subtree
    pub fn from_operator(root: &dyn Operator) -> Self {
        let mut nodes = Vec::new();
        collect(root, 0, &mut nodes);
        Self {
            nodes,
            unattached: Vec::new(),
        }
    }
}

fn collect(op: &dyn Operator, depth: usize, nodes: &mut Vec<ExplainNode>) {
    nodes.push(ExplainNode {
        depth,
        operator: op.name().to_string(),
        detail: op.detail(),
        schema: format_schema(op.schema()),
    });
    for child in op.children() {
        collect(child, depth + 1, nodes);
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        for node in &self.nodes {
            write!(f, "{:indent$}{}", "", node.operator, indent = node.depth * 2)?;
            if !node.detail.is_empty() {
                write!(f, " {}", node.detail)?;
            }
            writeln!(f, " -> {}", node.schema)?;
        }

        if !self.unattached.is_empty() {
            writeln!(f, "Unattached predicates:")?;
            for pred in &self.unattached {
                writeln!(f, "  - {}", pred)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::database;
    use crate::planner::{PlanOptions, QueryPlanner};
    use crate::query::parse_query;

    #[test]
    fn test_explain_tree_shape() {
        let (_tmp, catalog) = database(&[("R", "int int", "1, 2\n"), ("S", "int int", "2, 3\n")]);
        let query = parse_query("Q(x, z) :- R(x, y), S(y, z), x > 0").unwrap();
        let plan = QueryPlanner::new(&catalog, PlanOptions::default())
            .plan(&query)
            .unwrap();

        let explain = ExplainPlan::from_plan(&plan);
        let names: Vec<(usize, &str)> = explain
            .nodes
            .iter()
            .map(|n| (n.depth, n.operator.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "Project"),
                (1, "Project"),
                (2, "Join"),
                (3, "Select"),
                (4, "Scan"),
                (3, "Scan"),
            ]
        );

        let text = explain.to_string();
        assert!(text.starts_with("=== EXPLAIN PLAN ==="));
        assert!(text.contains("    Join [x, y, #0, z] ON $2 = $1"));
        assert!(text.contains("        Scan R -> [x, y]"));
        assert!(!text.contains("Unattached"));
    }
}
