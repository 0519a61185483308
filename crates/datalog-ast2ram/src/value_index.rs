//! The value index: where every variable occurrence lives in the tuple
//! environments of a lowered clause.

use datalog_ast::ArgumentKind;
use std::collections::{BTreeMap, BTreeSet};

/// A storage location: an element of some tuple environment, tagged as
/// concrete or lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub tuple_id: usize,
    pub element: usize,
    pub lattice: bool,
}

impl Location {
    pub fn concrete(tuple_id: usize, element: usize) -> Self {
        Location {
            tuple_id,
            element,
            lattice: false,
        }
    }

    pub fn lattice(tuple_id: usize, element: usize) -> Self {
        Location {
            tuple_id,
            element,
            lattice: true,
        }
    }
}

/// Records, per variable, every location it occurs at (the first is its
/// defining occurrence), plus the result locations of generators
/// (aggregators and multi-result functors).
#[derive(Debug, Clone, Default)]
pub struct ValueIndex {
    var_references: BTreeMap<String, Vec<Location>>,
    generator_locs: Vec<(ArgumentKind, Location)>,
    generator_levels: BTreeSet<usize>,
}

impl ValueIndex {
    pub fn new() -> Self {
        ValueIndex::default()
    }

    pub fn add_var_reference(&mut self, var: &str, loc: Location) {
        self.var_references
            .entry(var.to_string())
            .or_default()
            .push(loc);
    }

    /// Every variable with its occurrence list, in name order
    pub fn variable_references(&self) -> impl Iterator<Item = (&str, &[Location])> {
        self.var_references
            .iter()
            .map(|(name, locs)| (name.as_str(), locs.as_slice()))
    }

    /// The defining (first) occurrence of a variable
    pub fn definition_point(&self, var: &str) -> Option<Location> {
        self.var_references.get(var).and_then(|locs| locs.first().copied())
    }

    /// Every occurrence of one variable
    pub fn references(&self, var: &str) -> Option<&[Location]> {
        self.var_references.get(var).map(Vec::as_slice)
    }

    pub fn set_generator_loc(&mut self, generator: ArgumentKind, loc: Location) {
        self.generator_levels.insert(loc.tuple_id);
        self.generator_locs.push((generator, loc));
    }

    /// The result location of a generator, matched structurally
    pub fn generator_loc(&self, generator: &ArgumentKind) -> Option<Location> {
        self.generator_locs
            .iter()
            .find(|(candidate, _)| candidate == generator)
            .map(|(_, loc)| *loc)
    }

    /// Does this tuple level belong to a generator?
    pub fn is_generator_level(&self, tuple_id: usize) -> bool {
        self.generator_levels.contains(&tuple_id)
    }
}
