//! SIPS reordering scenarios over whole programs.

use crate::common::{atom, num, pos, rule, var};
use datalog_ast::{BinaryConstraint, ConstraintOp, Literal, Program};
use datalog_transform::{
    ordering_after_sips, ReorderLiterals, SipsStrategy, TransformConfig, TransformContext,
    Transformer,
};

// h(X, Y) :- p(X, Y), q(X), r(Y).
fn sample_clause() -> datalog_ast::Clause {
    rule(
        atom("h", vec![var("X"), var("Y")], vec![]),
        vec![
            pos("p", vec![var("X"), var("Y")], vec![]),
            pos("q", vec![var("X")], vec![]),
            pos("r", vec![var("Y")], vec![]),
        ],
    )
}

#[test]
fn test_least_free_pulls_small_atoms_forward() {
    // with nothing pre-bound, q has the fewest free arguments; choosing it
    // binds X, making p the next cheapest, then r
    let clause = sample_clause();
    assert_eq!(
        ordering_after_sips(&SipsStrategy::LeastFree, &clause),
        vec![1, 0, 2]
    );
}

#[test]
fn test_all_bound_reorders_once_a_binding_exists() {
    // an equality to a constant pre-binds X, so q is fully bound and the
    // body becomes q, p, r
    let mut clause = sample_clause();
    clause.body.push(Literal::Constraint(BinaryConstraint::new(
        ConstraintOp::Eq,
        var("X"),
        num("3"),
    )));

    let mut program = Program::new();
    program.add_clause(clause);

    let config = TransformConfig::default().with_sips("all-bound");
    let mut ctx = TransformContext::new(config);
    assert!(ReorderLiterals::new().apply(&mut program, &mut ctx));
    assert_eq!(
        program.clauses[0].to_string(),
        "h(X, Y) :- q(X), p(X, Y), r(Y), X = 3."
    );
}

#[test]
fn test_all_bound_without_bindings_keeps_source_order() {
    // no atom is ever fully bound up front, so the fallback walks the body
    // in source order and nothing changes
    let mut program = Program::new();
    program.add_clause(sample_clause());

    let config = TransformConfig::default().with_sips("all-bound");
    let mut ctx = TransformContext::new(config);
    assert!(!ReorderLiterals::new().apply(&mut program, &mut ctx));
}

#[test]
fn test_unknown_policy_keeps_source_order() {
    let mut program = Program::new();
    program.add_clause(sample_clause());

    let config = TransformConfig::default().with_sips("definitely-not-a-policy");
    let mut ctx = TransformContext::new(config);
    assert!(!ReorderLiterals::new().apply(&mut program, &mut ctx));
    assert_eq!(
        program.clauses[0].to_string(),
        "h(X, Y) :- p(X, Y), q(X), r(Y)."
    );
}

// Reordering preserves the multiset of body literals and the head.
#[test]
fn test_reordering_preserves_body_multiset() {
    let clause = sample_clause();
    for policy in [
        SipsStrategy::Naive,
        SipsStrategy::AllBound,
        SipsStrategy::MaxBound,
        SipsStrategy::MaxRatio,
        SipsStrategy::LeastFree,
        SipsStrategy::LeastFreeVars,
        SipsStrategy::Identity,
    ] {
        let reordered = datalog_transform::reorder_clause_with_sips(&policy, &clause)
            .unwrap_or_else(|| clause.clone());

        assert_eq!(reordered.head, clause.head, "{:?}", policy);
        let mut original: Vec<String> = clause.body.iter().map(|l| l.to_string()).collect();
        let mut permuted: Vec<String> = reordered.body.iter().map(|l| l.to_string()).collect();
        original.sort();
        permuted.sort();
        assert_eq!(original, permuted, "{:?}", policy);
    }
}
