//! I/O-type analysis: which relations are externally observable.

use datalog_ast::{Program, QualifiedName};
use std::collections::BTreeSet;

/// Derives per-relation I/O status from the program's directives. A
/// relation is I/O when any directive targets it; such relations must keep
/// their identity, so the minimiser never folds them away.
#[derive(Debug, Clone, Default)]
pub struct IoTypeAnalysis {
    io_relations: BTreeSet<QualifiedName>,
}

impl IoTypeAnalysis {
    pub const NAME: &'static str = "IO-type-analysis";

    pub fn run(program: &Program) -> Self {
        let mut io_relations = BTreeSet::new();
        for directive in &program.directives {
            io_relations.insert(directive.relation.clone());
        }
        IoTypeAnalysis { io_relations }
    }

    pub fn is_io(&self, relation: &QualifiedName) -> bool {
        self.io_relations.contains(relation)
    }
}
