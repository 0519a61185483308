//! The binding store: which variables of a clause are bound at a given
//! evaluation point.
//!
//! Construction seeds binding dependencies from the clause's equality
//! constraints (`v = expr` binds `v` once every variable of `expr` is
//! bound, and vice versa; a record equality `v = [a, b]` binds the record
//! fields once `v` is). Dependencies are reduced to a fixed point, so
//! variables equated to constants start out bound. The reorderer then binds
//! atom arguments strongly as it consumes atoms.

use datalog_ast::utility::{contains_aggregator, visit_constraints, visit_variables};
use datalog_ast::{Argument, ArgumentKind, Atom, BinaryConstraint, Clause, ConstraintOp};
use std::collections::{BTreeMap, BTreeSet};

/// How strongly a variable is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStrength {
    Unbound,
    Weakly,
    Strongly,
}

type ConjBindingSet = BTreeSet<String>;
type DisjBindingSet = BTreeSet<ConjBindingSet>;

#[derive(Debug, Clone, Default)]
pub struct BindingStore {
    strongly_bound: BTreeSet<String>,
    weakly_bound: BTreeSet<String>,
    variable_dependencies: BTreeMap<String, DisjBindingSet>,
}

impl BindingStore {
    pub fn new(clause: &Clause) -> Self {
        let mut store = BindingStore::default();
        store.generate_binding_dependencies(clause);
        store.reduce_dependencies();
        store
    }

    fn generate_binding_dependencies(&mut self, clause: &Clause) {
        // only equality constraints not involving aggregators are relevant
        let mut relevant: Vec<BinaryConstraint> = Vec::new();
        visit_constraints(clause, &mut |bc| {
            if bc.op == ConstraintOp::Eq
                && !contains_aggregator(&bc.lhs)
                && !contains_aggregator(&bc.rhs)
            {
                relevant.push(bc.clone());
            }
        });

        for bc in &relevant {
            self.process_equality_bindings(&bc.lhs, &bc.rhs);
            self.process_equality_bindings(&bc.rhs, &bc.lhs);
        }
    }

    fn process_equality_bindings(&mut self, lhs: &Argument, rhs: &Argument) {
        // only equalities affecting the bound status of a variable matter
        let var = match &lhs.kind {
            ArgumentKind::Variable(name) => name.as_ref().clone(),
            _ => return,
        };

        // once every variable of the rhs is bound, the lhs is too
        let mut dep_set = ConjBindingSet::new();
        visit_variables(rhs, &mut |sub| {
            dep_set.insert(sub.to_string());
        });
        self.add_binding_dependency(var.clone(), dep_set);

        // once the lhs is bound, each record field on the rhs is too
        if let ArgumentKind::RecordInit(args) = &rhs.kind {
            for arg in args {
                if let ArgumentKind::Variable(sub) = &arg.kind {
                    let mut dep = ConjBindingSet::new();
                    dep.insert(var.clone());
                    self.add_binding_dependency(sub.as_ref().clone(), dep);
                }
            }
        }
    }

    fn add_binding_dependency(&mut self, var: String, dependency: ConjBindingSet) {
        self.variable_dependencies
            .entry(var)
            .or_default()
            .insert(dependency);
    }

    fn reduce_conj(&self, dependency: &ConjBindingSet) -> ConjBindingSet {
        dependency
            .iter()
            .filter(|var| !self.strongly_bound.contains(*var))
            .cloned()
            .collect()
    }

    /// Reduce every dependency set against the strongly bound variables,
    /// binding variables whose dependencies are satisfied, until a fixed
    /// point is reached.
    fn reduce_dependencies(&mut self) {
        loop {
            let mut changed = false;
            let mut new_dependencies: BTreeMap<String, DisjBindingSet> = BTreeMap::new();
            let mut variables_to_bind: BTreeSet<String> = BTreeSet::new();

            for (head_var, dependencies) in &self.variable_dependencies {
                // no need to track dependencies of already-bound variables
                if self.strongly_bound.contains(head_var) {
                    changed = true;
                    continue;
                }

                let reduced: DisjBindingSet = dependencies
                    .iter()
                    .map(|dep| self.reduce_conj(dep))
                    .filter(|dep| !dep.is_empty())
                    .collect();

                if reduced.is_empty() || reduced.len() < dependencies.len() {
                    // at least one dependency fully satisfied
                    changed = true;
                    variables_to_bind.insert(head_var.clone());
                    continue;
                }

                changed |= reduced != *dependencies;
                new_dependencies.insert(head_var.clone(), reduced);
            }

            for var in variables_to_bind {
                self.strongly_bound.insert(var);
            }

            if !changed {
                break;
            }
            self.variable_dependencies = new_dependencies;
        }
    }

    pub fn bind_variable_strongly(&mut self, name: &str) {
        self.strongly_bound.insert(name.to_string());
        self.weakly_bound.remove(name);
        self.reduce_dependencies();
    }

    pub fn bind_variable_weakly(&mut self, name: &str) {
        if !self.strongly_bound.contains(name) {
            self.weakly_bound.insert(name.to_string());
        }
    }

    pub fn strength(&self, name: &str) -> BindingStrength {
        if self.strongly_bound.contains(name) {
            BindingStrength::Strongly
        } else if self.weakly_bound.contains(name) {
            BindingStrength::Weakly
        } else {
            BindingStrength::Unbound
        }
    }

    /// Bound at any non-unbound level
    pub fn is_bound(&self, name: &str) -> bool {
        self.strength(name) != BindingStrength::Unbound
    }

    /// An argument is grounded when it is a bound variable, a constant, or
    /// a term all of whose sub-arguments are grounded.
    pub fn is_bound_argument(&self, arg: &Argument) -> bool {
        match &arg.kind {
            ArgumentKind::Variable(name) => self.is_bound(name.as_ref()),
            ArgumentKind::UnnamedVariable => false,
            ArgumentKind::NumericConstant(_)
            | ArgumentKind::StringConstant(_)
            | ArgumentKind::NilConstant => true,
            ArgumentKind::RecordInit(args) => args.iter().all(|a| self.is_bound_argument(a)),
            ArgumentKind::IntrinsicFunctor { args, .. }
            | ArgumentKind::UserFunctor { args, .. } => {
                args.iter().all(|a| self.is_bound_argument(a))
            }
            ArgumentKind::Aggregator { .. } => false,
        }
    }

    /// Count the grounded concrete-argument positions of an atom
    pub fn num_bound_arguments(&self, atom: &Atom) -> usize {
        atom.concrete
            .iter()
            .filter(|arg| self.is_bound_argument(arg))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalog_ast::{Clause, Literal, NumericConstant, Span};
    use internment::Intern;

    fn var(name: &str) -> Argument {
        Argument::new(
            ArgumentKind::Variable(Intern::new(name.to_string())),
            Span::unknown(),
        )
    }

    fn num(text: &str) -> Argument {
        Argument::new(
            ArgumentKind::NumericConstant(NumericConstant::new(text)),
            Span::unknown(),
        )
    }

    fn atom(name: &str, args: Vec<Argument>) -> Atom {
        Atom::new(name.into(), args, vec![])
    }

    fn eq(lhs: Argument, rhs: Argument) -> Literal {
        Literal::Constraint(BinaryConstraint::new(ConstraintOp::Eq, lhs, rhs))
    }

    #[test]
    fn test_variable_equated_to_constant_is_bound() {
        // p(X) :- q(X, Y), X = 3.
        let clause = Clause::new(
            atom("p", vec![var("X")]),
            vec![
                Literal::Atom(atom("q", vec![var("X"), var("Y")])),
                eq(var("X"), num("3")),
            ],
        );
        let store = BindingStore::new(&clause);

        assert!(store.is_bound("X"));
        assert!(!store.is_bound("Y"));
        assert_eq!(store.strength("X"), BindingStrength::Strongly);
    }

    #[test]
    fn test_transitive_equalities_reach_fixed_point() {
        // p(X) :- q(Z), X = Y, Y = 3, Z = X.
        let clause = Clause::new(
            atom("p", vec![var("X")]),
            vec![
                Literal::Atom(atom("q", vec![var("Z")])),
                eq(var("X"), var("Y")),
                eq(var("Y"), num("3")),
                eq(var("Z"), var("X")),
            ],
        );
        let store = BindingStore::new(&clause);

        assert!(store.is_bound("X"));
        assert!(store.is_bound("Y"));
        assert!(store.is_bound("Z"));
    }

    #[test]
    fn test_variable_to_variable_alone_binds_nothing() {
        let clause = Clause::new(
            atom("p", vec![var("X")]),
            vec![
                Literal::Atom(atom("q", vec![var("X"), var("Y")])),
                eq(var("X"), var("Y")),
            ],
        );
        let store = BindingStore::new(&clause);

        assert!(!store.is_bound("X"));
        assert!(!store.is_bound("Y"));
    }

    #[test]
    fn test_binding_propagates_through_dependencies() {
        // X = Y; binding Y strongly afterwards also binds X
        let clause = Clause::new(
            atom("p", vec![var("X")]),
            vec![
                Literal::Atom(atom("q", vec![var("Y")])),
                eq(var("X"), var("Y")),
            ],
        );
        let mut store = BindingStore::new(&clause);
        assert!(!store.is_bound("X"));

        store.bind_variable_strongly("Y");
        assert!(store.is_bound("X"));
    }

    #[test]
    fn test_record_equality_binds_fields() {
        // V = [A, B]: binding V binds A and B
        let record = Argument::new(
            ArgumentKind::RecordInit(vec![var("A"), var("B")]),
            Span::unknown(),
        );
        let clause = Clause::new(
            atom("p", vec![var("V")]),
            vec![
                Literal::Atom(atom("q", vec![var("V")])),
                eq(var("V"), record),
            ],
        );
        let mut store = BindingStore::new(&clause);
        assert!(!store.is_bound("A"));

        store.bind_variable_strongly("V");
        assert!(store.is_bound("A"));
        assert!(store.is_bound("B"));
    }

    #[test]
    fn test_num_bound_arguments() {
        let clause = Clause::new(
            atom("p", vec![var("X")]),
            vec![
                Literal::Atom(atom("q", vec![var("X"), var("Y"), num("1")])),
                eq(var("X"), num("3")),
            ],
        );
        let store = BindingStore::new(&clause);

        // X bound by equality, the constant is always bound, Y is free
        let q = atom("q", vec![var("X"), var("Y"), num("1")]);
        assert_eq!(store.num_bound_arguments(&q), 2);
    }

    #[test]
    fn test_weak_binding_counts_as_bound() {
        let clause = Clause::new(atom("p", vec![var("X")]), vec![]);
        let mut store = BindingStore::new(&clause);
        store.bind_variable_weakly("X");

        assert!(store.is_bound("X"));
        assert_eq!(store.strength("X"), BindingStrength::Weakly);

        store.bind_variable_strongly("X");
        assert_eq!(store.strength("X"), BindingStrength::Strongly);
    }
}
