//! Depth-first AST traversals and clause-rewriting helpers.

use crate::{Argument, ArgumentKind, Atom, BinaryConstraint, Clause, Literal, QualifiedName};
use std::collections::BTreeMap;

/// Visit every atom reachable from a clause, head first, including atoms
/// nested in aggregator bodies.
pub fn visit_atoms(clause: &Clause, f: &mut impl FnMut(&Atom)) {
    visit_atoms_in_atom(&clause.head, f);
    for lit in &clause.body {
        visit_atoms_in_literal(lit, f);
    }
}

fn visit_atoms_in_literal(lit: &Literal, f: &mut impl FnMut(&Atom)) {
    match lit {
        Literal::Atom(atom) => visit_atoms_in_atom(atom, f),
        Literal::Negation(neg) => visit_atoms_in_atom(&neg.atom, f),
        Literal::Constraint(bc) => {
            visit_atoms_in_argument(&bc.lhs, f);
            visit_atoms_in_argument(&bc.rhs, f);
        }
    }
}

fn visit_atoms_in_atom(atom: &Atom, f: &mut impl FnMut(&Atom)) {
    f(atom);
    for arg in atom.arguments() {
        visit_atoms_in_argument(arg, f);
    }
}

fn visit_atoms_in_argument(arg: &Argument, f: &mut impl FnMut(&Atom)) {
    match &arg.kind {
        ArgumentKind::RecordInit(args) => {
            for arg in args {
                visit_atoms_in_argument(arg, f);
            }
        }
        ArgumentKind::IntrinsicFunctor { args, .. } | ArgumentKind::UserFunctor { args, .. } => {
            for arg in args {
                visit_atoms_in_argument(arg, f);
            }
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                visit_atoms_in_argument(target, f);
            }
            for lit in body {
                visit_atoms_in_literal(lit, f);
            }
        }
        _ => {}
    }
}

/// Visit every named variable reachable from an argument
pub fn visit_variables(arg: &Argument, f: &mut impl FnMut(&str)) {
    match &arg.kind {
        ArgumentKind::Variable(name) => f(name.as_ref()),
        ArgumentKind::RecordInit(args) => {
            for arg in args {
                visit_variables(arg, f);
            }
        }
        ArgumentKind::IntrinsicFunctor { args, .. } | ArgumentKind::UserFunctor { args, .. } => {
            for arg in args {
                visit_variables(arg, f);
            }
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                visit_variables(target, f);
            }
            for lit in body {
                visit_variables_in_literal(lit, f);
            }
        }
        _ => {}
    }
}

/// Visit every named variable reachable from a literal
pub fn visit_variables_in_literal(lit: &Literal, f: &mut impl FnMut(&str)) {
    match lit {
        Literal::Atom(atom) => {
            for arg in atom.arguments() {
                visit_variables(arg, f);
            }
        }
        Literal::Negation(neg) => {
            for arg in neg.atom.arguments() {
                visit_variables(arg, f);
            }
        }
        Literal::Constraint(bc) => {
            visit_variables(&bc.lhs, f);
            visit_variables(&bc.rhs, f);
        }
    }
}

/// Visit every binary constraint reachable from a clause, including
/// constraints nested in aggregator bodies.
pub fn visit_constraints(clause: &Clause, f: &mut impl FnMut(&BinaryConstraint)) {
    for arg in clause.head.arguments() {
        visit_constraints_in_argument(arg, f);
    }
    for lit in &clause.body {
        visit_constraints_in_literal(lit, f);
    }
}

fn visit_constraints_in_literal(lit: &Literal, f: &mut impl FnMut(&BinaryConstraint)) {
    match lit {
        Literal::Atom(atom) => {
            for arg in atom.arguments() {
                visit_constraints_in_argument(arg, f);
            }
        }
        Literal::Negation(neg) => {
            for arg in neg.atom.arguments() {
                visit_constraints_in_argument(arg, f);
            }
        }
        Literal::Constraint(bc) => {
            f(bc);
            visit_constraints_in_argument(&bc.lhs, f);
            visit_constraints_in_argument(&bc.rhs, f);
        }
    }
}

fn visit_constraints_in_argument(arg: &Argument, f: &mut impl FnMut(&BinaryConstraint)) {
    match &arg.kind {
        ArgumentKind::RecordInit(args) => {
            for arg in args {
                visit_constraints_in_argument(arg, f);
            }
        }
        ArgumentKind::IntrinsicFunctor { args, .. } | ArgumentKind::UserFunctor { args, .. } => {
            for arg in args {
                visit_constraints_in_argument(arg, f);
            }
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                visit_constraints_in_argument(target, f);
            }
            for lit in body {
                visit_constraints_in_literal(lit, f);
            }
        }
        _ => {}
    }
}

/// Does this argument contain an aggregator anywhere beneath it?
pub fn contains_aggregator(arg: &Argument) -> bool {
    match &arg.kind {
        ArgumentKind::Aggregator { .. } => true,
        ArgumentKind::RecordInit(args) => args.iter().any(contains_aggregator),
        ArgumentKind::IntrinsicFunctor { args, .. } | ArgumentKind::UserFunctor { args, .. } => {
            args.iter().any(contains_aggregator)
        }
        _ => false,
    }
}

/// Rewrite every atom in a clause whose name appears in the map, top-down,
/// to use the mapped name. Returns true when any atom was renamed.
pub fn rename_atoms(clause: &mut Clause, renaming: &BTreeMap<QualifiedName, QualifiedName>) -> bool {
    let mut changed = rename_atom(&mut clause.head, renaming);
    for lit in &mut clause.body {
        changed |= rename_atoms_in_literal(lit, renaming);
    }
    changed
}

fn rename_atom(atom: &mut Atom, renaming: &BTreeMap<QualifiedName, QualifiedName>) -> bool {
    let mut changed = false;
    if let Some(new_name) = renaming.get(&atom.name) {
        atom.name = new_name.clone();
        changed = true;
    }
    for arg in atom.concrete.iter_mut().chain(atom.lattice.iter_mut()) {
        changed |= rename_atoms_in_argument(arg, renaming);
    }
    changed
}

fn rename_atoms_in_literal(
    lit: &mut Literal,
    renaming: &BTreeMap<QualifiedName, QualifiedName>,
) -> bool {
    match lit {
        Literal::Atom(atom) => rename_atom(atom, renaming),
        Literal::Negation(neg) => rename_atom(&mut neg.atom, renaming),
        Literal::Constraint(bc) => {
            let mut changed = rename_atoms_in_argument(&mut bc.lhs, renaming);
            changed |= rename_atoms_in_argument(&mut bc.rhs, renaming);
            changed
        }
    }
}

fn rename_atoms_in_argument(
    arg: &mut Argument,
    renaming: &BTreeMap<QualifiedName, QualifiedName>,
) -> bool {
    match &mut arg.kind {
        ArgumentKind::RecordInit(args) => {
            let mut changed = false;
            for arg in args {
                changed |= rename_atoms_in_argument(arg, renaming);
            }
            changed
        }
        ArgumentKind::IntrinsicFunctor { args, .. } | ArgumentKind::UserFunctor { args, .. } => {
            let mut changed = false;
            for arg in args {
                changed |= rename_atoms_in_argument(arg, renaming);
            }
            changed
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            let mut changed = false;
            if let Some(target) = target {
                changed |= rename_atoms_in_argument(target, renaming);
            }
            for lit in body {
                changed |= rename_atoms_in_literal(lit, renaming);
            }
            changed
        }
        _ => false,
    }
}

/// Build a new clause whose body atoms are permuted by `ordering` while all
/// non-atom literals keep their original positions.
///
/// `ordering[i] = j` places the clause's `j`-th body atom (counting atoms
/// only) into the `i`-th atom slot. The ordering must be a permutation of
/// `0..num_atoms`.
pub fn reorder_atoms(clause: &Clause, ordering: &[usize]) -> Clause {
    let atom_positions: Vec<usize> = clause
        .body
        .iter()
        .enumerate()
        .filter_map(|(i, lit)| lit.is_atom().then_some(i))
        .collect();
    assert_eq!(
        atom_positions.len(),
        ordering.len(),
        "ordering must cover every body atom"
    );

    let mut new_body = clause.body.clone();
    for (slot, &src) in ordering.iter().enumerate() {
        new_body[atom_positions[slot]] = clause.body[atom_positions[src]].clone();
    }

    Clause {
        head: clause.head.clone(),
        body: new_body,
        plan: clause.plan.clone(),
        span: clause.span,
    }
}
