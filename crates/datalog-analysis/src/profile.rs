//! Profile-use analysis: relation sizes recorded by a previous profiled run.
//!
//! Profile-file ingestion lives with the CLI collaborator; this analysis is
//! the narrow query interface the reorderer consults.

use datalog_ast::QualifiedName;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ProfileUseAnalysis {
    sizes: BTreeMap<QualifiedName, u64>,
}

impl ProfileUseAnalysis {
    pub const NAME: &'static str = "profile-use-analysis";

    pub fn new() -> Self {
        ProfileUseAnalysis::default()
    }

    pub fn from_sizes(sizes: impl IntoIterator<Item = (QualifiedName, u64)>) -> Self {
        ProfileUseAnalysis {
            sizes: sizes.into_iter().collect(),
        }
    }

    /// The recorded size of a relation. A relation missing from the profile
    /// is treated as maximally expensive.
    pub fn relation_size(&self, relation: &QualifiedName) -> u64 {
        self.sizes.get(relation).copied().unwrap_or(u64::MAX)
    }
}
