//! Program minimisation: remove clauses and relations that contribute
//! nothing to the computed fixed point.
//!
//! Four reductions run in a fixed order, invalidating cached analyses
//! between steps:
//!
//! 1. duplicate body literals are dropped within each clause
//! 2. clauses whose head recurs in their own body are removed
//! 3. within each relation, bijectively equivalent clauses collapse to one
//!    representative
//! 4. equivalent singleton-defined relations are folded onto a canonical
//!    one, and every reference is rewritten
//!
//! Clauses the normaliser cannot model fully are never merged, so an
//! incomplete analysis degrades to keeping more of the program, never to
//! changing its meaning.

use crate::{TransformContext, Transformer};
use datalog_analysis::are_bijectively_equivalent;
use datalog_ast::{Literal, Program, QualifiedName};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct MinimiseProgram;

impl MinimiseProgram {
    pub fn new() -> Self {
        MinimiseProgram
    }

    /// Drop every body literal structurally equal to an earlier one in the
    /// same body; duplicates add no constraints.
    fn reduce_clause_bodies(program: &mut Program) -> bool {
        let mut changed = false;
        for clause in &mut program.clauses {
            let mut keep = vec![true; clause.body.len()];
            for i in 0..clause.body.len() {
                for j in 0..i {
                    if clause.body[i] == clause.body[j] {
                        keep[i] = false;
                        break;
                    }
                }
            }
            if keep.contains(&false) {
                let mut kept = keep.iter();
                clause.body.retain(|_| *kept.next().expect("keep covers body"));
                changed = true;
            }
        }
        changed
    }

    /// Remove clauses whose head appears among their own body literals;
    /// they derive nothing that is not already derived.
    fn remove_redundant_clauses(program: &mut Program) -> bool {
        let removed = program.remove_clauses_where(|clause| {
            clause
                .body
                .iter()
                .any(|lit| matches!(lit, Literal::Atom(atom) if *atom == clause.head))
        });
        removed > 0
    }

    /// Partition each relation's clauses into bijective-equivalence classes
    /// and keep one representative per class.
    fn reduce_locally_equivalent_clauses(
        program: &mut Program,
        ctx: &mut TransformContext,
    ) -> bool {
        // group clause indices by head relation, in first-appearance order
        let mut groups: Vec<(QualifiedName, Vec<usize>)> = Vec::new();
        for (idx, clause) in program.clauses.iter().enumerate() {
            match groups.iter_mut().find(|(name, _)| *name == clause.head.name) {
                Some((_, indices)) => indices.push(idx),
                None => groups.push((clause.head.name.clone(), vec![idx])),
            }
        }

        let normalisations = ctx.normalisations(program);
        let mut to_delete: BTreeSet<usize> = BTreeSet::new();

        for (_, indices) in &groups {
            let mut representatives: Vec<usize> = Vec::new();
            for &idx in indices {
                let in_existing_class = representatives.iter().any(|&rep| {
                    equivalent_by_index(normalisations, rep, idx)
                });
                if in_existing_class {
                    to_delete.insert(idx);
                } else {
                    representatives.push(idx);
                }
            }
        }

        if to_delete.is_empty() {
            return false;
        }

        let mut idx = 0;
        program.clauses.retain(|_| {
            let keep = !to_delete.contains(&idx);
            idx += 1;
            keep
        });
        true
    }

    /// Fold equivalent non-I/O relations defined by a single clause onto a
    /// canonical representative, rewriting every reference.
    fn reduce_singleton_relations(program: &mut Program, ctx: &mut TransformContext) -> bool {
        // all singleton relations to consider
        let singleton_clause_indices: Vec<usize> = {
            let io_types = ctx.io_types(program);
            program
                .relations
                .iter()
                .filter(|rel| !io_types.is_io(&rel.name))
                .filter_map(|rel| {
                    let indices = program.clause_indices_of(&rel.name);
                    match indices.as_slice() {
                        [only] => Some(*only),
                        _ => None,
                    }
                })
                .collect()
        };

        // pairwise equivalence; the equivalence check ignores head names
        let mut redundant: BTreeSet<usize> = BTreeSet::new();
        let mut canonical_name: BTreeMap<QualifiedName, QualifiedName> = BTreeMap::new();
        {
            let normalisations = ctx.normalisations(program);
            for (i, &first) in singleton_clause_indices.iter().enumerate() {
                if redundant.contains(&first) {
                    continue;
                }
                for &second in &singleton_clause_indices[i + 1..] {
                    if redundant.contains(&second) {
                        continue;
                    }
                    if equivalent_by_index(normalisations, first, second) {
                        redundant.insert(second);
                        canonical_name.insert(
                            program.clauses[second].head.name.clone(),
                            program.clauses[first].head.name.clone(),
                        );
                    }
                }
            }
        }

        // remove the redundant relation definitions
        let redundant_names: Vec<QualifiedName> = redundant
            .iter()
            .map(|&idx| program.clauses[idx].head.name.clone())
            .collect();
        for name in &redundant_names {
            let existed = program.remove_relation(name);
            debug_assert!(existed, "redundant relation must be declared");
        }

        // rewrite every remaining reference to use the canonical name
        program.rename_atoms(&canonical_name);

        !canonical_name.is_empty()
    }
}

fn equivalent_by_index(
    normalisations: &datalog_analysis::ClauseNormalisationAnalysis,
    left: usize,
    right: usize,
) -> bool {
    are_bijectively_equivalent(
        normalisations.normalisation(left),
        normalisations.normalisation(right),
    )
}

impl Transformer for MinimiseProgram {
    fn name(&self) -> &'static str {
        "MinimiseProgram"
    }

    fn apply(&mut self, program: &mut Program, ctx: &mut TransformContext) -> bool {
        let mut changed = false;
        changed |= Self::reduce_clause_bodies(program);
        if changed {
            ctx.invalidate_analyses();
        }
        changed |= Self::remove_redundant_clauses(program);
        if changed {
            ctx.invalidate_analyses();
        }
        changed |= Self::reduce_locally_equivalent_clauses(program, ctx);
        if changed {
            ctx.invalidate_analyses();
        }
        changed |= Self::reduce_singleton_relations(program, ctx);
        changed
    }
}
