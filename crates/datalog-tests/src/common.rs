//! Shared builders for the scenario and property tests.

use datalog_ast::{
    Argument, ArgumentKind, Atom, Clause, Literal, Negation, NumericConstant, Span,
};
use internment::Intern;

pub fn var(name: &str) -> Argument {
    Argument::new(
        ArgumentKind::Variable(Intern::new(name.to_string())),
        Span::unknown(),
    )
}

pub fn num(text: &str) -> Argument {
    Argument::new(
        ArgumentKind::NumericConstant(NumericConstant::new(text)),
        Span::unknown(),
    )
}

pub fn atom(name: &str, concrete: Vec<Argument>, lattice: Vec<Argument>) -> Atom {
    Atom::new(name.into(), concrete, lattice)
}

pub fn pos(name: &str, concrete: Vec<Argument>, lattice: Vec<Argument>) -> Literal {
    Literal::Atom(atom(name, concrete, lattice))
}

pub fn neg(name: &str, concrete: Vec<Argument>, lattice: Vec<Argument>) -> Literal {
    Literal::Negation(Negation::new(atom(name, concrete, lattice)))
}

pub fn rule(head: Atom, body: Vec<Literal>) -> Clause {
    Clause::new(head, body)
}

/// Rename every variable of a clause through the given function
pub fn rename_variables(clause: &Clause, rename: &impl Fn(&str) -> String) -> Clause {
    let mut renamed = clause.clone();
    rename_in_atom(&mut renamed.head, rename);
    for lit in &mut renamed.body {
        rename_in_literal(lit, rename);
    }
    renamed
}

fn rename_in_literal(lit: &mut Literal, rename: &impl Fn(&str) -> String) {
    match lit {
        Literal::Atom(atom) => rename_in_atom(atom, rename),
        Literal::Negation(negation) => rename_in_atom(&mut negation.atom, rename),
        Literal::Constraint(bc) => {
            rename_in_argument(&mut bc.lhs, rename);
            rename_in_argument(&mut bc.rhs, rename);
        }
    }
}

fn rename_in_atom(atom: &mut Atom, rename: &impl Fn(&str) -> String) {
    for arg in atom.concrete.iter_mut().chain(atom.lattice.iter_mut()) {
        rename_in_argument(arg, rename);
    }
}

fn rename_in_argument(arg: &mut Argument, rename: &impl Fn(&str) -> String) {
    match &mut arg.kind {
        ArgumentKind::Variable(name) => {
            *name = Intern::new(rename(name.as_ref()));
        }
        ArgumentKind::RecordInit(args) => {
            for sub in args {
                rename_in_argument(sub, rename);
            }
        }
        ArgumentKind::IntrinsicFunctor { args, .. } | ArgumentKind::UserFunctor { args, .. } => {
            for sub in args {
                rename_in_argument(sub, rename);
            }
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                rename_in_argument(target, rename);
            }
            for lit in body {
                rename_in_literal(lit, rename);
            }
        }
        _ => {}
    }
}
