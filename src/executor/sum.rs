//! SUM aggregation, global or grouped by the head variables

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::vec;

use crate::query::{SumAggregate, Term};

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::{BoxedOperator, Operator};
use super::predicate::Operand;
use super::tuple::{format_schema, position_of, Label, Tuple};

/// How grouped sums are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationStrategy {
    /// One full child scan per emitted group; constant extra memory
    /// besides the finalized-key log
    #[default]
    Rescan,
    /// One child scan total; all group totals held in memory
    Hash,
}

impl AggregationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationStrategy::Rescan => "rescan",
            AggregationStrategy::Hash => "hash",
        }
    }
}

impl FromStr for AggregationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rescan" => Ok(AggregationStrategy::Rescan),
            "hash" => Ok(AggregationStrategy::Hash),
            other => Err(format!(
                "Invalid aggregation strategy: {}. Must be 'rescan' or 'hash'",
                other
            )),
        }
    }
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emits one tuple per distinct group key: the key followed by the sum of
/// the per-row products.
///
/// The per-row value is seeded by the first operand and every later
/// integer operand multiplies into it. Operands that do not resolve to an
/// integer are skipped, so a non-integer first operand leaves the row value
/// at 0. Overflow is an error.
///
/// With no group variables the operator is global: it emits exactly one
/// tuple, `0` over an empty input.
///
/// Group output order is the first-occurrence order of keys in the child.
/// Emitted keys are logged and the log survives `reset()`.
pub struct Sum<'a> {
    child: BoxedOperator<'a>,
    relation: String,
    strategy: AggregationStrategy,
    group_positions: Vec<usize>,
    operands: Vec<Operand>,
    schema: Vec<Label>,
    finalized: HashSet<Vec<Term>>,
    /// Hash strategy output, filled on first `next()`
    pending: Option<vec::IntoIter<Tuple>>,
    global_emitted: bool,
}

impl<'a> Sum<'a> {
    /// Groups by `group_by` (must all exist in the child schema).
    pub fn new(
        child: BoxedOperator<'a>,
        relation: impl Into<String>,
        group_by: &[String],
        aggregate: &SumAggregate,
        strategy: AggregationStrategy,
    ) -> ExecutorResult<Self> {
        let child_schema = child.schema();

        let mut group_positions = Vec::with_capacity(group_by.len());
        let mut schema = Vec::with_capacity(group_by.len() + 1);
        for name in group_by {
            let pos = position_of(child_schema, name).ok_or_else(|| {
                ExecutorError::execution_failed(format!(
                    "Group-by variable '{}' is not bound by the body",
                    name
                ))
            })?;
            group_positions.push(pos);
            schema.push(Label::var(name.as_str()));
        }
        schema.push(Label::Aggregate);

        let operands = aggregate
            .terms
            .iter()
            .map(|term| Operand::bind(term, |name| position_of(child_schema, name)))
            .collect();

        Ok(Self {
            child,
            relation: relation.into(),
            strategy,
            group_positions,
            operands,
            schema,
            finalized: HashSet::new(),
            pending: None,
            global_emitted: false,
        })
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    fn is_global(&self) -> bool {
        self.group_positions.is_empty()
    }

    fn group_key(&self, values: &[Term]) -> Vec<Term> {
        self.group_positions
            .iter()
            .map(|&pos| values[pos].clone())
            .collect()
    }

    /// Product of the integer operands of one row.
    fn row_value(&self, values: &[Term]) -> ExecutorResult<i64> {
        let mut value = 0i64;
        for (i, operand) in self.operands.iter().enumerate() {
            let Some(v) = operand.resolve(values, &[]).and_then(Term::as_integer) else {
                continue;
            };
            value = if i == 0 {
                v
            } else {
                value
                    .checked_mul(v)
                    .ok_or_else(|| ExecutorError::aggregate_overflow(&self.relation))?
            };
        }
        Ok(value)
    }

    fn add(&self, total: i64, value: i64) -> ExecutorResult<i64> {
        total
            .checked_add(value)
            .ok_or_else(|| ExecutorError::aggregate_overflow(&self.relation))
    }

    fn output(&self, mut key: Vec<Term>, total: i64) -> Tuple {
        key.push(Term::Integer(total));
        Tuple::new(self.relation.clone(), key)
    }

    fn next_global(&mut self) -> ExecutorResult<Option<Tuple>> {
        if self.global_emitted {
            return Ok(None);
        }
        let mut total = 0i64;
        while let Some(tuple) = self.child.next()? {
            let value = self.row_value(&tuple.values)?;
            total = self.add(total, value)?;
        }
        self.global_emitted = true;
        Ok(Some(self.output(Vec::new(), total)))
    }

    /// Finds the first key not yet emitted, sums it over a full pass, then
    /// rewinds the child for the next call.
    fn next_rescan(&mut self) -> ExecutorResult<Option<Tuple>> {
        let mut target: Option<Vec<Term>> = None;
        let mut total = 0i64;

        while let Some(tuple) = self.child.next()? {
            let key = self.group_key(&tuple.values);
            match target.as_ref().map(|current| *current == key) {
                Some(true) => {
                    let value = self.row_value(&tuple.values)?;
                    total = self.add(total, value)?;
                }
                Some(false) => {}
                None => {
                    if !self.finalized.contains(&key) {
                        total = self.row_value(&tuple.values)?;
                        target = Some(key);
                    }
                }
            }
        }

        match target {
            Some(key) => {
                self.child.reset()?;
                self.finalized.insert(key.clone());
                Ok(Some(self.output(key, total)))
            }
            None => Ok(None),
        }
    }

    /// Drains the child once, keeping totals in first-occurrence order.
    fn build_groups(&mut self) -> ExecutorResult<Vec<Tuple>> {
        let mut order: Vec<Vec<Term>> = Vec::new();
        let mut totals: HashMap<Vec<Term>, i64> = HashMap::new();

        while let Some(tuple) = self.child.next()? {
            let key = self.group_key(&tuple.values);
            if self.finalized.contains(&key) {
                continue;
            }
            let value = self.row_value(&tuple.values)?;
            match totals.get_mut(&key) {
                Some(total) => {
                    *total = total
                        .checked_add(value)
                        .ok_or_else(|| ExecutorError::aggregate_overflow(&self.relation))?;
                }
                None => {
                    totals.insert(key.clone(), value);
                    order.push(key);
                }
            }
        }

        let mut rows = Vec::with_capacity(order.len());
        for key in order {
            let total = totals.get(&key).copied().unwrap_or_default();
            self.finalized.insert(key.clone());
            rows.push(self.output(key, total));
        }
        Ok(rows)
    }

    fn next_hash(&mut self) -> ExecutorResult<Option<Tuple>> {
        if self.pending.is_none() {
            let rows = self.build_groups()?;
            self.pending = Some(rows.into_iter());
        }
        Ok(self.pending.as_mut().and_then(Iterator::next))
    }
}

impl Operator for Sum<'_> {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        if self.is_global() {
            return self.next_global();
        }
        match self.strategy {
            AggregationStrategy::Rescan => self.next_rescan(),
            AggregationStrategy::Hash => self.next_hash(),
        }
    }

    /// Rewinds the child only; emitted groups stay emitted.
    fn reset(&mut self) -> ExecutorResult<()> {
        self.pending = None;
        self.child.reset()
    }

    fn schema(&self) -> &[Label] {
        &self.schema
    }

    fn name(&self) -> &'static str {
        "Sum"
    }

    fn detail(&self) -> String {
        let operands: Vec<String> = self.operands.iter().map(ToString::to_string).collect();
        format!(
            "{} SUM({}) [{}]",
            format_schema(&self.schema),
            operands.join(" * "),
            self.strategy
        )
    }

    fn children(&self) -> Vec<&dyn Operator> {
        vec![self.child.as_ref()]
    }
}
