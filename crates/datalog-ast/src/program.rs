//! The program container owning every declaration and clause.

use crate::utility;
use crate::{
    Clause, Component, ComponentInit, Directive, FunctorDecl, Lattice, Pragma, QualifiedName,
    Relation, TypeDecl,
};
use std::collections::BTreeMap;
use std::fmt;

/// A whole program: relations (unique by name), clauses (head relations may
/// repeat), and the remaining declaration lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub types: Vec<TypeDecl>,
    pub relations: Vec<Relation>,
    pub functors: Vec<FunctorDecl>,
    pub lattices: Vec<Lattice>,
    pub clauses: Vec<Clause>,
    pub directives: Vec<Directive>,
    pub components: Vec<Component>,
    pub instantiations: Vec<ComponentInit>,
    pub pragmas: Vec<Pragma>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    /// Look up a relation by name
    pub fn relation(&self, name: &QualifiedName) -> Option<&Relation> {
        self.relations.iter().find(|rel| rel.name == *name)
    }

    pub fn relation_mut(&mut self, name: &QualifiedName) -> Option<&mut Relation> {
        self.relations.iter_mut().find(|rel| rel.name == *name)
    }

    /// Look up a lattice declaration by name
    pub fn lattice(&self, name: &QualifiedName) -> Option<&Lattice> {
        self.lattices.iter().find(|lat| lat.name() == name)
    }

    /// The clauses whose head refers to the given relation, in program order
    pub fn clauses_of(&self, name: &QualifiedName) -> Vec<&Clause> {
        self.clauses
            .iter()
            .filter(|clause| clause.head.name == *name)
            .collect()
    }

    /// Indices into `clauses` of the clauses defining the given relation
    pub fn clause_indices_of(&self, name: &QualifiedName) -> Vec<usize> {
        self.clauses
            .iter()
            .enumerate()
            .filter_map(|(i, clause)| (clause.head.name == *name).then_some(i))
            .collect()
    }

    pub fn add_relation(&mut self, relation: Relation) {
        debug_assert!(
            self.relation(&relation.name).is_none(),
            "relation already declared"
        );
        self.relations.push(relation);
    }

    /// Remove a relation declaration together with its clauses and
    /// directives. Returns true when the declaration existed.
    pub fn remove_relation(&mut self, name: &QualifiedName) -> bool {
        let before = self.relations.len();
        self.relations.retain(|rel| rel.name != *name);
        self.clauses.retain(|clause| clause.head.name != *name);
        self.directives.retain(|dir| dir.relation != *name);
        self.relations.len() != before
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Remove clauses matching a predicate; returns how many were removed
    pub fn remove_clauses_where(&mut self, mut pred: impl FnMut(&Clause) -> bool) -> usize {
        let before = self.clauses.len();
        self.clauses.retain(|clause| !pred(clause));
        before - self.clauses.len()
    }

    pub fn add_directive(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Rewrite every atom whose name is in the map's domain to use the
    /// mapped name, across all clauses. Returns true when anything changed.
    pub fn rename_atoms(&mut self, renaming: &BTreeMap<QualifiedName, QualifiedName>) -> bool {
        let mut changed = false;
        for clause in &mut self.clauses {
            changed |= utility::rename_atoms(clause, renaming);
        }
        changed
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lattice in &self.lattices {
            writeln!(f, "{}", lattice)?;
        }
        for relation in &self.relations {
            writeln!(f, "{}", relation)?;
        }
        for clause in &self.clauses {
            writeln!(f, "{}", clause)?;
        }
        for directive in &self.directives {
            writeln!(f, "{}", directive)?;
        }
        Ok(())
    }
}
