//! Query planner
//!
//! Turns a parsed [`Query`] into a left-deep operator tree:
//!
//! 1. Validate the query against the catalog.
//! 2. Normalize relational atoms: every constant argument and every repeated
//!    variable becomes a fresh variable plus an equality comparison.
//! 3. Classify comparisons: a comparison whose variables occur in two or more
//!    relational atoms is a join condition, otherwise a selection.
//! 4. For each relational atom in body order: Scan, Select for the
//!    selections it fully contains, then Join with the tree built so far
//!    using the join conditions that span both sides. Without an aggregate,
//!    an eager Project drops columns nothing downstream needs.
//! 5. Wrap the root in the head's Project or Sum.
//!
//! Building is deterministic: the same query and catalog give the same tree.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::executor::{
    AggregationStrategy, BoxedOperator, Join, Label, Operator, Project, Scan, Select, Sum,
};
use crate::observability::{log_event_with_fields, Event};
use crate::query::{ComparisonAtom, ComparisonOp, Query, RelationalAtom, Term};

use super::context::PlanningContext;
use super::errors::{PlannerError, PlannerResult};

/// Knobs that change the shape of the plan but not its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Insert intermediate projections after each merge step
    pub eager_projection: bool,
    /// Strategy for grouped SUM
    pub aggregation: AggregationStrategy,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            eager_projection: true,
            aggregation: AggregationStrategy::Rescan,
        }
    }
}

/// How a comparison is attached to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Confined to one relational atom
    Selection,
    /// Spans two or more relational atoms
    Join,
}

/// A built operator tree ready to be driven.
pub struct QueryPlan<'c> {
    root: BoxedOperator<'c>,
    /// Comparisons that no operator evaluates
    unattached: Vec<ComparisonAtom>,
    fresh_variables: usize,
    aliases: usize,
}

impl<'c> QueryPlan<'c> {
    pub fn root(&self) -> &(dyn Operator + 'c) {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> &mut (dyn Operator + 'c) {
        self.root.as_mut()
    }

    pub fn into_root(self) -> BoxedOperator<'c> {
        self.root
    }

    /// Comparisons dropped because no merge step could evaluate them.
    pub fn unattached(&self) -> &[ComparisonAtom] {
        &self.unattached
    }

    /// Variables introduced by normalization.
    pub fn fresh_variables(&self) -> usize {
        self.fresh_variables
    }

    /// Join aliases introduced for shared variables.
    pub fn aliases(&self) -> usize {
        self.aliases
    }

    /// Total number of operators in the tree.
    pub fn operator_count(&self) -> usize {
        count_operators(self.root())
    }
}

fn count_operators(op: &dyn Operator) -> usize {
    1 + op.children().into_iter().map(count_operators).sum::<usize>()
}

/// Query planner over one catalog
pub struct QueryPlanner<'c> {
    catalog: &'c Catalog,
    options: PlanOptions,
}

impl<'c> QueryPlanner<'c> {
    /// Creates a new planner
    pub fn new(catalog: &'c Catalog, options: PlanOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Checks the query against the catalog without opening any file.
    pub fn validate(&self, query: &Query) -> PlannerResult<()> {
        let relational: Vec<&RelationalAtom> = query.relational_atoms().collect();
        if relational.is_empty() {
            return Err(PlannerError::query_invalid(
                "Query body must contain at least one relational atom",
            ));
        }

        for atom in &relational {
            let types = self
                .catalog
                .schema(&atom.name)
                .map_err(|_| PlannerError::unknown_relation(atom.name.as_str()))?;
            if types.len() != atom.terms.len() {
                return Err(PlannerError::arity_mismatch(
                    atom.name.as_str(),
                    types.len(),
                    atom.terms.len(),
                ));
            }
        }

        let bound: HashSet<&str> = relational.iter().flat_map(|a| a.variables()).collect();

        for name in &query.head.variables {
            if !bound.contains(name.as_str()) {
                return Err(PlannerError::unbound_variable(name.as_str(), "Head"));
            }
        }

        if let Some(aggregate) = &query.head.aggregate {
            for name in aggregate.terms.iter().filter_map(Term::as_variable) {
                if !bound.contains(name) {
                    return Err(PlannerError::unbound_variable(name, "Aggregate"));
                }
            }
        }

        Ok(())
    }

    /// Validates the query and builds its operator tree.
    ///
    /// Scans open their data files here, so a missing file fails the build.
    pub fn plan(&self, query: &Query) -> PlannerResult<QueryPlan<'c>> {
        self.validate(query)?;

        let mut ctx = PlanningContext::new(query);
        let (atoms, comparisons) = normalize(query, &mut ctx);
        let mut necessary = necessary_variables(query);
        // Generated equalities must survive eager projection until attached.
        for comparison in &comparisons[query.comparison_atoms().count()..] {
            for name in comparison.variables() {
                if !necessary.iter().any(|n| n == name) {
                    necessary.push(name.to_string());
                }
            }
        }
        let kinds: Vec<PredicateKind> = comparisons.iter().map(|c| classify(c, &atoms)).collect();
        let mut attached = vec![false; comparisons.len()];
        let aggregate = query.head.aggregate.as_ref();

        let mut root: Option<BoxedOperator<'c>> = None;

        for (i, atom) in atoms.iter().enumerate() {
            let atom_vars: HashSet<&str> = atom.variables().collect();

            let mut op: BoxedOperator<'c> = Box::new(Scan::new(self.catalog, atom)?);

            let selections = take_matching(&comparisons, &kinds, &mut attached, |c, kind| {
                kind == PredicateKind::Selection
                    && c.variables().iter().all(|v| atom_vars.contains(v))
            });
            if !selections.is_empty() {
                op = Box::new(Select::new(op, &selections));
            }

            let merged: BoxedOperator<'c> = match root.take() {
                None => op,
                Some(left) => {
                    let left_vars: HashSet<String> = left
                        .schema()
                        .iter()
                        .filter_map(Label::variable_name)
                        .map(str::to_string)
                        .collect();

                    let joins = take_matching(&comparisons, &kinds, &mut attached, |c, kind| {
                        let vars = c.variables();
                        kind == PredicateKind::Join
                            && vars.iter().any(|v| left_vars.contains(*v))
                            && vars.iter().any(|v| atom_vars.contains(v))
                            && vars
                                .iter()
                                .all(|v| left_vars.contains(*v) || atom_vars.contains(v))
                    });

                    Box::new(Join::new(left, op, &joins, &mut ctx)?)
                }
            };

            root = Some(if aggregate.is_none() && self.options.eager_projection {
                eager_project(merged, &query.head.name, &necessary, &atoms[i + 1..])
            } else {
                merged
            });
        }

        let root = root.ok_or_else(|| {
            PlannerError::query_invalid("Query body must contain at least one relational atom")
        })?;

        let unattached: Vec<ComparisonAtom> = comparisons
            .iter()
            .zip(&attached)
            .filter(|(_, done)| !**done)
            .map(|(c, _)| c.clone())
            .collect();
        for predicate in &unattached {
            let text = predicate.to_string();
            log_event_with_fields(
                Event::PredicateUnattached,
                &[("predicate", text.as_str()), ("query", query.head.name.as_str())],
            );
        }

        let root: BoxedOperator<'c> = match aggregate {
            None => Box::new(Project::new(
                root,
                query.head.name.as_str(),
                &query.head.variables,
            )),
            Some(aggregate) => Box::new(Sum::new(
                root,
                query.head.name.as_str(),
                &query.head.variables,
                aggregate,
                self.options.aggregation,
            )?),
        };

        let plan = QueryPlan {
            root,
            unattached,
            fresh_variables: ctx.fresh_variables(),
            aliases: ctx.aliases(),
        };

        let operators = plan.operator_count().to_string();
        let aliases = plan.aliases().to_string();
        log_event_with_fields(
            Event::PlanBuilt,
            &[
                ("aliases", aliases.as_str()),
                ("operators", operators.as_str()),
                ("query", query.head.name.as_str()),
            ],
        );

        Ok(plan)
    }
}

/// Rewrites constants and repeated variables in relational atoms into fresh
/// variables, appending one equality comparison for each.
///
/// The returned comparisons are the query's own, in body order, followed by
/// the generated ones.
pub fn normalize(
    query: &Query,
    ctx: &mut PlanningContext,
) -> (Vec<RelationalAtom>, Vec<ComparisonAtom>) {
    let mut comparisons: Vec<ComparisonAtom> = query.comparison_atoms().cloned().collect();
    let mut atoms = Vec::new();

    for atom in query.relational_atoms() {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut terms = Vec::with_capacity(atom.terms.len());

        for term in &atom.terms {
            match term.as_variable() {
                Some(name) if seen.insert(name) => terms.push(term.clone()),
                _ => {
                    let fresh = ctx.fresh_variable();
                    comparisons.push(ComparisonAtom::new(
                        Term::var(fresh.as_str()),
                        ComparisonOp::Eq,
                        term.clone(),
                    ));
                    terms.push(Term::var(fresh));
                }
            }
        }

        atoms.push(RelationalAtom::new(atom.name.as_str(), terms));
    }

    (atoms, comparisons)
}

/// Head variables followed by every variable of the query's comparisons,
/// first occurrence order.
pub fn necessary_variables(query: &Query) -> Vec<String> {
    let mut necessary: Vec<String> = Vec::new();
    let comparison_vars = query.comparison_atoms().flat_map(|c| c.variables());

    for name in query
        .head
        .variables
        .iter()
        .map(String::as_str)
        .chain(comparison_vars)
    {
        if !necessary.iter().any(|n| n == name) {
            necessary.push(name.to_string());
        }
    }
    necessary
}

/// Join if the comparison's variables occur in two or more atoms.
pub fn classify(predicate: &ComparisonAtom, atoms: &[RelationalAtom]) -> PredicateKind {
    let vars = predicate.variables();
    let touching = atoms
        .iter()
        .filter(|atom| vars.iter().any(|v| atom.contains_variable(v)))
        .count();

    if touching >= 2 {
        PredicateKind::Join
    } else {
        PredicateKind::Selection
    }
}

/// Marks and returns every not-yet-attached comparison accepted by `pick`.
fn take_matching(
    comparisons: &[ComparisonAtom],
    kinds: &[PredicateKind],
    attached: &mut [bool],
    pick: impl Fn(&ComparisonAtom, PredicateKind) -> bool,
) -> Vec<ComparisonAtom> {
    let mut taken = Vec::new();
    for (idx, comparison) in comparisons.iter().enumerate() {
        if !attached[idx] && pick(comparison, kinds[idx]) {
            attached[idx] = true;
            taken.push(comparison.clone());
        }
    }
    taken
}

/// Projects `root` onto the variables still needed: the necessary set plus
/// anything a pending atom joins on. Returns `root` unchanged if nothing
/// would be dropped.
fn eager_project<'c>(
    root: BoxedOperator<'c>,
    head_name: &str,
    necessary: &[String],
    pending: &[RelationalAtom],
) -> BoxedOperator<'c> {
    let keep: Vec<String> = root
        .schema()
        .iter()
        .filter_map(Label::variable_name)
        .filter(|name| {
            necessary.iter().any(|n| n == name)
                || pending.iter().any(|atom| atom.contains_variable(name))
        })
        .map(str::to_string)
        .collect();

    if keep.len() < root.schema().len() {
        Box::new(Project::new(root, head_name, &keep))
    } else {
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::{database, drain};
    use crate::planner::PlannerErrorCode;
    use crate::query::parse_query;

    fn run(relations: &[(&str, &str, &str)], text: &str, options: PlanOptions) -> Vec<String> {
        let (_tmp, catalog) = database(relations);
        let query = parse_query(text).unwrap();
        let planner = QueryPlanner::new(&catalog, options);
        let mut plan = planner.plan(&query).unwrap();
        drain(plan.root_mut())
    }

    fn plan_error(relations: &[(&str, &str, &str)], text: &str) -> PlannerErrorCode {
        let (_tmp, catalog) = database(relations);
        let query = parse_query(text).unwrap();
        let planner = QueryPlanner::new(&catalog, PlanOptions::default());
        planner.plan(&query).err().unwrap().code()
    }

    #[test]
    fn test_normalize_constants_and_repeats() {
        let query = parse_query("Q(x) :- R(x, 1, x, 'a')").unwrap();
        let mut ctx = PlanningContext::new(&query);
        let (atoms, comparisons) = normalize(&query, &mut ctx);

        assert_eq!(
            atoms[0].terms,
            vec![
                Term::var("x"),
                Term::var("_k0"),
                Term::var("_k1"),
                Term::var("_k2")
            ]
        );
        assert_eq!(
            comparisons,
            vec![
                ComparisonAtom::new(Term::var("_k0"), ComparisonOp::Eq, Term::Integer(1)),
                ComparisonAtom::new(Term::var("_k1"), ComparisonOp::Eq, Term::var("x")),
                ComparisonAtom::new(Term::var("_k2"), ComparisonOp::Eq, Term::string("a")),
            ]
        );
    }

    #[test]
    fn test_classify_predicates() {
        let atoms = vec![
            RelationalAtom::new("R", vec![Term::var("x"), Term::var("y")]),
            RelationalAtom::new("S", vec![Term::var("y"), Term::var("z")]),
        ];
        let sel = ComparisonAtom::new(Term::var("x"), ComparisonOp::Lt, Term::Integer(3));
        let join = ComparisonAtom::new(Term::var("x"), ComparisonOp::Lt, Term::var("z"));
        let shared = ComparisonAtom::new(Term::var("y"), ComparisonOp::Gt, Term::Integer(0));
        assert_eq!(classify(&sel, &atoms), PredicateKind::Selection);
        assert_eq!(classify(&join, &atoms), PredicateKind::Join);
        assert_eq!(classify(&shared, &atoms), PredicateKind::Join);
    }

    #[test]
    fn test_necessary_variables() {
        let query = parse_query("Q(x) :- R(x, y), S(y, z), z > 2, x != y").unwrap();
        assert_eq!(necessary_variables(&query), vec!["x", "z", "y"]);
    }

    #[test]
    fn test_constant_in_atom_filters() {
        let rows = run(
            &[("R", "int int", "1, 2\n3, 4\n1, 5\n")],
            "Q(y) :- R(1, y)",
            PlanOptions::default(),
        );
        assert_eq!(rows, vec!["2", "5"]);
    }

    #[test]
    fn test_repeated_variable_filters() {
        let rows = run(
            &[("R", "int int", "1, 1\n2, 3\n4, 4\n")],
            "Q(x) :- R(x, x)",
            PlanOptions::default(),
        );
        assert_eq!(rows, vec!["1", "4"]);
    }

    #[test]
    fn test_repeated_variable_shared_with_later_atom() {
        let relations = [("R", "int int", "1, 2\n3, 3\n"), ("S", "int", "1\n3\n")];
        let (_tmp, catalog) = database(&relations);
        let query = parse_query("Q(x) :- R(x, x), S(x)").unwrap();
        let mut plan = QueryPlanner::new(&catalog, PlanOptions::default())
            .plan(&query)
            .unwrap();
        assert!(plan.unattached().is_empty());
        assert_eq!(drain(plan.root_mut()), vec!["3"]);

        let lazy = PlanOptions {
            eager_projection: false,
            ..PlanOptions::default()
        };
        assert_eq!(run(&relations, "Q(x) :- R(x, x), S(x)", lazy), vec!["3"]);
    }

    #[test]
    fn test_three_way_join_with_eager_projection() {
        let relations = [
            ("R", "int int", "1, 2\n2, 3\n"),
            ("S", "int int", "2, 10\n3, 20\n"),
            ("T", "int string", "10, 'ten'\n20, 'twenty'\n"),
        ];
        let text = "Q(x, w) :- R(x, y), S(y, z), T(z, w)";
        let eager = run(&relations, text, PlanOptions::default());
        let lazy = run(
            &relations,
            text,
            PlanOptions {
                eager_projection: false,
                ..PlanOptions::default()
            },
        );
        assert_eq!(eager, vec!["1, ten", "2, twenty"]);
        assert_eq!(eager, lazy);
    }

    #[test]
    fn test_join_predicate_attached_once() {
        let (_tmp, catalog) = database(&[
            ("R", "int", "1\n5\n"),
            ("S", "int", "3\n"),
        ]);
        let query = parse_query("Q(a, b) :- R(a), S(b), a < b").unwrap();
        let planner = QueryPlanner::new(&catalog, PlanOptions::default());
        let mut plan = planner.plan(&query).unwrap();
        assert!(plan.unattached().is_empty());
        assert_eq!(drain(plan.root_mut()), vec!["1, 3"]);
    }

    #[test]
    fn test_unbound_comparison_is_unattached() {
        let (_tmp, catalog) = database(&[("R", "int", "1\n")]);
        let query = parse_query("Q(a) :- R(a), q > 0").unwrap();
        let planner = QueryPlanner::new(&catalog, PlanOptions::default());
        let mut plan = planner.plan(&query).unwrap();
        assert_eq!(plan.unattached().len(), 1);
        assert_eq!(drain(plan.root_mut()), vec!["1"]);
    }

    #[test]
    fn test_aggregate_plan_has_no_eager_projection() {
        let (_tmp, catalog) = database(&[
            ("R", "int int", "1, 2\n1, 2\n"),
            ("S", "int int", "2, 7\n"),
        ]);
        let query = parse_query("Q(x, SUM(z)) :- R(x, y), S(y, z)").unwrap();
        let planner = QueryPlanner::new(&catalog, PlanOptions::default());
        let mut plan = planner.plan(&query).unwrap();
        assert_eq!(plan.root().name(), "Sum");
        // Duplicate R rows each contribute
        assert_eq!(drain(plan.root_mut()), vec!["1, 14"]);
    }

    #[test]
    fn test_planning_contexts_independent() {
        let (_tmp, catalog) = database(&[("R", "int int", "1, 2\n")]);
        let query = parse_query("Q(y) :- R(1, y), R(z, y)").unwrap();
        let planner = QueryPlanner::new(&catalog, PlanOptions::default());
        let first = planner.plan(&query).unwrap();
        let second = planner.plan(&query).unwrap();
        assert_eq!(first.fresh_variables(), second.fresh_variables());
        assert_eq!(first.aliases(), second.aliases());
        assert_eq!(first.aliases(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let rel = [("R", "int int", "1, 2\n")];
        assert_eq!(
            plan_error(&rel, "Q(x) :- S(x)"),
            PlannerErrorCode::MiniUnknownRelation
        );
        assert_eq!(
            plan_error(&rel, "Q(x) :- R(x)"),
            PlannerErrorCode::MiniArityMismatch
        );
        assert_eq!(
            plan_error(&rel, "Q(z) :- R(x, y)"),
            PlannerErrorCode::MiniUnboundVariable
        );
        assert_eq!(
            plan_error(&rel, "Q(SUM(z)) :- R(x, y)"),
            PlannerErrorCode::MiniUnboundVariable
        );
    }

    #[test]
    fn test_missing_data_file_fails_build() {
        let (tmp, catalog) = database(&[("R", "int", "1\n")]);
        std::fs::remove_file(catalog.file_path("R")).unwrap();
        let query = parse_query("Q(x) :- R(x)").unwrap();
        let planner = QueryPlanner::new(&catalog, PlanOptions::default());
        let err = planner.plan(&query).err().unwrap();
        assert_eq!(err.code(), PlannerErrorCode::MiniPlanBuildFailed);
        drop(tmp);
    }
}
