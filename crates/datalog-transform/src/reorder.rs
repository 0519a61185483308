//! SIPS-directed literal reordering.
//!
//! Reordering is rule-local: each clause is reordered independently, facts
//! and clauses carrying an explicit execution plan are left alone. A policy
//! picks the next atom to evaluate given the current bindings; choosing an
//! atom strongly binds its concrete variable arguments.

use crate::{SipsStrategy, TransformContext, Transformer};
use datalog_analysis::{BindingStore, ProfileUseAnalysis};
use datalog_ast::utility::{reorder_atoms, visit_variables};
use datalog_ast::{Atom, Clause, Program};
use std::collections::BTreeSet;

/// A sideways-information-passing strategy: pick the index of the next atom
/// to place, given the remaining candidates (consumed slots are `None`) and
/// the variables bound so far.
pub trait Sips {
    fn choose(&self, atoms: &[Option<&Atom>], bindings: &BindingStore) -> usize;
}

fn first_remaining(atoms: &[Option<&Atom>]) -> usize {
    atoms.iter().position(Option::is_some).unwrap_or(0)
}

impl Sips for SipsStrategy {
    fn choose(&self, atoms: &[Option<&Atom>], bindings: &BindingStore) -> usize {
        match self {
            SipsStrategy::Naive => {
                // first atom with at least one bound argument, or no
                // arguments at all
                for (i, slot) in atoms.iter().enumerate() {
                    let Some(atom) = slot else { continue };
                    if atom.is_proposition() || bindings.num_bound_arguments(atom) >= 1 {
                        return i;
                    }
                }
                first_remaining(atoms)
            }
            SipsStrategy::AllBound => {
                // prioritise atoms with every concrete argument bound
                for (i, slot) in atoms.iter().enumerate() {
                    let Some(atom) = slot else { continue };
                    if atom.is_proposition()
                        || bindings.num_bound_arguments(atom) == atom.concrete_arity()
                    {
                        return i;
                    }
                }
                first_remaining(atoms)
            }
            SipsStrategy::MaxBound => {
                // most bound arguments wins; propositions win immediately;
                // ties break to the earliest index
                let mut max_bound: i64 = -1;
                let mut max_idx = 0;
                for (i, slot) in atoms.iter().enumerate() {
                    let Some(atom) = slot else { continue };
                    if atom.is_proposition() {
                        return i;
                    }
                    let num_bound = bindings.num_bound_arguments(atom) as i64;
                    if num_bound > max_bound {
                        max_bound = num_bound;
                        max_idx = i;
                    }
                }
                max_idx
            }
            SipsStrategy::MaxRatio => {
                // highest bound/arity ratio wins; compared as cross
                // products to avoid floating point
                let larger_ratio = |lhs: (i64, i64), rhs: (i64, i64)| lhs.0 * rhs.1 > lhs.1 * rhs.0;
                let mut max_ratio: (i64, i64) = (-1, 1);
                let mut max_idx = 0;
                for (i, slot) in atoms.iter().enumerate() {
                    let Some(atom) = slot else { continue };
                    if atom.is_proposition() {
                        return i;
                    }
                    let ratio = (
                        bindings.num_bound_arguments(atom) as i64,
                        atom.concrete_arity() as i64,
                    );
                    if larger_ratio(ratio, max_ratio) {
                        max_ratio = ratio;
                        max_idx = i;
                    }
                }
                max_idx
            }
            SipsStrategy::LeastFree => {
                // fewest unbound arguments wins
                let mut least_free: i64 = -1;
                let mut least_idx = 0;
                for (i, slot) in atoms.iter().enumerate() {
                    let Some(atom) = slot else { continue };
                    if atom.is_proposition() {
                        return i;
                    }
                    let num_free =
                        (atom.concrete_arity() - bindings.num_bound_arguments(atom)) as i64;
                    if least_free == -1 || num_free < least_free {
                        least_free = num_free;
                        least_idx = i;
                    }
                }
                least_idx
            }
            SipsStrategy::LeastFreeVars => {
                // fewest distinct unbound variables wins
                let mut least_free: i64 = -1;
                let mut least_idx = 0;
                for (i, slot) in atoms.iter().enumerate() {
                    let Some(atom) = slot else { continue };
                    if atom.is_proposition() {
                        return i;
                    }
                    // a set avoids double-counting repeated variables
                    let mut free_vars: BTreeSet<String> = BTreeSet::new();
                    for arg in &atom.concrete {
                        visit_variables(arg, &mut |name| {
                            if !bindings.is_bound(name) {
                                free_vars.insert(name.to_string());
                            }
                        });
                    }
                    let num_free_vars = free_vars.len() as i64;
                    if least_free == -1 || num_free_vars < least_free {
                        least_free = num_free_vars;
                        least_idx = i;
                    }
                }
                least_idx
            }
            SipsStrategy::Identity => first_remaining(atoms),
        }
    }
}

/// The profile-guided policy: minimise `ln(|R|) * free/args`, with
/// propositions prioritised.
pub struct ProfileSips<'a> {
    pub profile: &'a ProfileUseAnalysis,
}

impl Sips for ProfileSips<'_> {
    fn choose(&self, atoms: &[Option<&Atom>], bindings: &BindingStore) -> usize {
        let mut optimal: Option<f64> = None;
        let mut optimal_idx = 0;
        for (i, slot) in atoms.iter().enumerate() {
            let Some(atom) = slot else { continue };
            if atom.is_proposition() {
                return i;
            }

            let num_args = atom.concrete_arity();
            let num_bound = bindings.num_bound_arguments(atom);
            let num_free = (num_args - num_bound) as f64;
            let size = self.profile.relation_size(&atom.name) as f64;
            let value = size.ln() * num_free / (num_args as f64);

            if optimal.map_or(true, |best| value < best) {
                optimal = Some(value);
                optimal_idx = i;
            }
        }
        optimal_idx
    }
}

/// Compute the atom ordering a policy produces for a clause. Entry `i` of
/// the result names the source atom placed at atom slot `i`.
pub fn ordering_after_sips(sips: &dyn Sips, clause: &Clause) -> Vec<usize> {
    let mut bindings = BindingStore::new(clause);
    let mut atoms: Vec<Option<&Atom>> = clause.body_atoms().into_iter().map(Some).collect();
    let mut new_order = vec![0; atoms.len()];

    let mut num_added = 0;
    while num_added < atoms.len() {
        // grab the next atom, based on the policy
        let next_idx = sips.choose(&atoms, &bindings);
        let next_atom = atoms[next_idx].expect("policy must choose an unconsumed atom");

        // variable arguments of the chosen atom become strongly bound;
        // functors and other compound arguments newly bind nothing
        for arg in &next_atom.concrete {
            if let Some(var) = arg.as_variable() {
                bindings.bind_variable_strongly(var.as_ref());
            }
        }

        new_order[num_added] = next_idx;
        atoms[next_idx] = None;
        num_added += 1;
    }

    new_order
}

/// Reorder one clause under a policy. Returns `None` when the clause keeps
/// its order: facts, clauses with an explicit plan, and identity orderings.
pub fn reorder_clause_with_sips(sips: &dyn Sips, clause: &Clause) -> Option<Clause> {
    // clauses with a fixed execution plan keep it
    if clause.plan.is_some() {
        return None;
    }

    let new_ordering = ordering_after_sips(sips, clause);
    let change_needed = new_ordering.iter().enumerate().any(|(i, &j)| i != j);

    change_needed.then(|| reorder_atoms(clause, &new_ordering))
}

/// The literal-reordering transformer
#[derive(Debug, Default)]
pub struct ReorderLiterals;

impl ReorderLiterals {
    pub fn new() -> Self {
        ReorderLiterals
    }

    fn reorder_all(program: &mut Program, sips: &dyn Sips) -> bool {
        let mut changed = false;
        for clause in &mut program.clauses {
            if let Some(reordered) = reorder_clause_with_sips(sips, clause) {
                *clause = reordered;
                changed = true;
            }
        }
        changed
    }
}

impl Transformer for ReorderLiterals {
    fn name(&self) -> &'static str {
        "ReorderLiterals"
    }

    fn apply(&mut self, program: &mut Program, ctx: &mut TransformContext) -> bool {
        // static reordering under the configured policy
        let sips = ctx.config().sips;
        let mut changed = Self::reorder_all(program, &sips);

        // profile-guided second pass
        if ctx.config().profile_use {
            let profiler_sips = ProfileSips {
                profile: ctx.profile(),
            };
            changed |= Self::reorder_all(program, &profiler_sips);
        }

        changed
    }
}
