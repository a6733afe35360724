//! Operator trait for pull-based evaluation
//!
//! Operators form a tree. The root is driven by repeated `next()` calls;
//! each operator pulls from its children on demand. `reset()` rewinds an
//! operator (and its subtree) so the next `next()` starts over.

use super::errors::ExecutorResult;
use super::tuple::{Label, Tuple};

/// A node in the evaluation tree.
pub trait Operator {
    /// Returns the next tuple, or `None` when exhausted.
    ///
    /// Calling `next()` again after `None` keeps returning `None` until
    /// `reset()` is called.
    fn next(&mut self) -> ExecutorResult<Option<Tuple>>;

    /// Rewinds the operator and its children.
    fn reset(&mut self) -> ExecutorResult<()>;

    /// Names of the positions of every emitted tuple.
    fn schema(&self) -> &[Label];

    /// Operator type name used in plan explanations.
    fn name(&self) -> &'static str;

    /// One-line operator-specific detail for plan explanations.
    fn detail(&self) -> String {
        String::new()
    }

    /// Child operators, left to right.
    fn children(&self) -> Vec<&dyn Operator> {
        Vec::new()
    }
}

/// A boxed operator for dynamic dispatch.
pub type BoxedOperator<'a> = Box<dyn Operator + 'a>;

/// Source of fresh alias labels for join renaming.
///
/// One allocator is shared by every join of a plan so aliases never repeat.
pub trait LabelAllocator {
    fn fresh_alias(&mut self) -> Label;
}

/// Sequential alias allocator: `#0`, `#1`, ...
#[derive(Debug, Default)]
pub struct AliasCounter {
    next: usize,
}

impl AliasCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aliases handed out.
    pub fn issued(&self) -> usize {
        self.next
    }
}

impl LabelAllocator for AliasCounter {
    fn fresh_alias(&mut self) -> Label {
        let label = Label::Alias(self.next);
        self.next += 1;
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_counter_is_sequential() {
        let mut aliases = AliasCounter::new();
        assert_eq!(aliases.fresh_alias(), Label::Alias(0));
        assert_eq!(aliases.fresh_alias(), Label::Alias(1));
        assert_eq!(aliases.issued(), 2);
    }
}
