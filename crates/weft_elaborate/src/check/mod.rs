//! Hardware-legality checks over aggregated metadata.
//!
//! [`LegalityChecker`] runs its rules in registration order and stops at the
//! first violation. The built-in rules, in order: single writer, nested
//! writer, slice overlap, port discipline.

mod nested_writer;
mod port_discipline;
mod single_writer;
mod slice_overlap;

pub use nested_writer::NestedWriter;
pub use port_discipline::PortDiscipline;
pub use single_writer::SingleWriter;
pub use slice_overlap::SliceOverlap;

use crate::aggregate::Aggregate;
use crate::errors::ElabError;
use indexmap::{IndexMap, IndexSet};
use weft_diagnostics::DiagnosticCode;
use weft_ir::{BlockId, Design, SignalId};

/// Everything a rule can look at.
pub struct CheckContext<'a> {
    /// The object graph.
    pub design: &'a Design,
    /// Aggregated metadata of the elaborated tree.
    pub aggregate: &'a Aggregate,
    /// Every written signal and the blocks writing it, in block order.
    pub writers: IndexMap<SignalId, IndexSet<BlockId>>,
}

impl<'a> CheckContext<'a> {
    /// Builds the context, inverting block write sets into the writer map.
    pub fn new(design: &'a Design, aggregate: &'a Aggregate) -> Self {
        let mut writers: IndexMap<SignalId, IndexSet<BlockId>> = IndexMap::new();
        for (block, sets) in aggregate.blocks() {
            for &signal in &sets.writes {
                writers.entry(signal).or_default().insert(block);
            }
        }
        Self {
            design,
            aggregate,
            writers,
        }
    }

    /// The first block writing `signal`, if any.
    pub fn writer(&self, signal: SignalId) -> Option<BlockId> {
        self.writers
            .get(&signal)
            .and_then(|blocks| blocks.first().copied())
    }
}

/// One legality rule.
pub trait LegalityRule {
    /// Diagnostic code of the violations this rule reports.
    fn code(&self) -> DiagnosticCode;

    /// Short kebab-case name, such as `single-writer`.
    fn name(&self) -> &str;

    /// What the rule enforces.
    fn description(&self) -> &str;

    /// Fails with the first violation found.
    fn check(&self, ctx: &CheckContext<'_>) -> Result<(), ElabError>;
}

/// Runs legality rules in order.
pub struct LegalityChecker {
    rules: Vec<Box<dyn LegalityRule>>,
}

impl Default for LegalityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl LegalityChecker {
    /// Creates a checker with every built-in rule.
    pub fn new() -> Self {
        let mut checker = Self { rules: Vec::new() };
        register_builtin_rules(&mut checker);
        checker
    }

    /// Appends a rule.
    pub fn register(&mut self, rule: Box<dyn LegalityRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Checks the aggregated metadata, failing on the first violation.
    pub fn check(&self, design: &Design, aggregate: &Aggregate) -> Result<(), ElabError> {
        let ctx = CheckContext::new(design, aggregate);
        for rule in &self.rules {
            tracing::debug!(rule = rule.name(), "running legality rule");
            rule.check(&ctx)?;
        }
        Ok(())
    }
}

/// Registers the built-in rules in their required order.
pub fn register_builtin_rules(checker: &mut LegalityChecker) {
    checker.register(Box::new(SingleWriter));
    checker.register(Box::new(NestedWriter));
    checker.register(Box::new(SliceOverlap));
    checker.register(Box::new(PortDiscipline));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_run_in_order() {
        let checker = LegalityChecker::new();
        assert_eq!(
            checker.rule_names(),
            vec!["single-writer", "nested-writer", "slice-overlap", "port-discipline"]
        );
    }
}
