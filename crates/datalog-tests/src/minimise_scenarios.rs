//! End-to-end minimisation scenarios over whole programs.

use crate::common::{atom, neg, num, pos, rule, var};
use datalog_ast::{Clause, Directive, DirectiveKind, Program, Relation};
use datalog_transform::{
    MinimiseProgram, TransformConfig, TransformContext, Transformer, TransformerPipeline,
};

fn minimise(program: &mut Program) -> bool {
    let mut ctx = TransformContext::new(TransformConfig::default());
    MinimiseProgram::new().apply(program, &mut ctx)
}

// Constant-and-lattice equivalence: of the four facts only the literal
// duplicate goes; the rest differ in their constants.
#[test]
fn test_duplicate_facts_with_lattice_constants() {
    let mut program = Program::new();
    program.add_clause(Clause::fact(atom("A", vec![num("0"), num("0")], vec![num("0")])));
    program.add_clause(Clause::fact(atom("A", vec![num("0"), num("0")], vec![num("0")])));
    program.add_clause(Clause::fact(atom("A", vec![num("0"), num("0")], vec![num("1")])));
    program.add_clause(Clause::fact(atom("A", vec![num("0"), num("1")], vec![num("0")])));

    assert!(minimise(&mut program));

    let printed: Vec<String> = program.clauses.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        printed,
        vec![
            "A(0, 0; 0).".to_string(),
            "A(0, 0; 1).".to_string(),
            "A(0, 1; 0).".to_string(),
        ]
    );
}

// Body-permutation equivalence: the same rule up to alias naming and
// literal order collapses to one clause.
#[test]
fn test_permuted_alias_rules_collapse() {
    use datalog_ast::{BinaryConstraint, ConstraintOp, Literal};

    let constraints = |x: &str, y: &str| {
        vec![
            Literal::Constraint(BinaryConstraint::new(ConstraintOp::Ne, var(x), num("3"))),
            Literal::Constraint(BinaryConstraint::new(ConstraintOp::Lt, var(x), var(y))),
            Literal::Constraint(BinaryConstraint::new(ConstraintOp::Gt, var(y), num("3"))),
        ]
    };

    let mut program = Program::new();
    let mut body1 = vec![
        pos("A", vec![var("z"), var("y")], vec![var("l")]),
        pos("A", vec![var("z"), var("x")], vec![var("l")]),
        neg("B", vec![var("x")], vec![]),
        pos("B", vec![var("y")], vec![]),
    ];
    body1.extend(constraints("x", "y"));
    program.add_clause(rule(atom("C", vec![var("z")], vec![]), body1));

    // alias-resolved copy: head variable renamed, literals permuted
    let mut body2 = constraints("x", "y");
    body2.extend(vec![
        pos("B", vec![var("y")], vec![]),
        pos("A", vec![var("r"), var("x")], vec![var("l")]),
        pos("A", vec![var("r"), var("y")], vec![var("l")]),
        neg("B", vec![var("x")], vec![]),
    ]);
    program.add_clause(rule(atom("C", vec![var("r")], vec![]), body2));

    assert!(minimise(&mut program));
    assert_eq!(program.clauses.len(), 1);
}

// Binding mismatch: distinct lattice-argument variables block equivalence.
#[test]
fn test_lattice_binding_mismatch_retains_both() {
    let mut program = Program::new();
    program.add_clause(rule(
        atom("C", vec![var("z")], vec![]),
        vec![
            pos("A", vec![var("z"), var("y")], vec![var("l")]),
            pos("A", vec![var("z"), var("x")], vec![var("l")]),
        ],
    ));
    program.add_clause(rule(
        atom("C", vec![var("z")], vec![]),
        vec![
            pos("A", vec![var("z"), var("y")], vec![var("l")]),
            pos("A", vec![var("z"), var("x")], vec![var("k")]),
        ],
    ));

    assert!(!minimise(&mut program));
    assert_eq!(program.clauses.len(), 2);
}

// Body self-duplicate: p(X) :- q(X), q(X), r(X). loses one q.
#[test]
fn test_duplicate_body_literal_dropped() {
    let mut program = Program::new();
    program.add_clause(rule(
        atom("p", vec![var("X")], vec![]),
        vec![
            pos("q", vec![var("X")], vec![]),
            pos("q", vec![var("X")], vec![]),
            pos("r", vec![var("X")], vec![]),
        ],
    ));

    assert!(minimise(&mut program));
    assert_eq!(program.clauses[0].to_string(), "p(X) :- q(X), r(X).");
}

// Tautology: p(X) :- p(X), X != 1. disappears.
#[test]
fn test_tautological_clause_removed() {
    use datalog_ast::{BinaryConstraint, ConstraintOp, Literal};

    let mut program = Program::new();
    program.add_clause(rule(
        atom("p", vec![var("X")], vec![]),
        vec![
            pos("p", vec![var("X")], vec![]),
            Literal::Constraint(BinaryConstraint::new(ConstraintOp::Ne, var("X"), num("1"))),
        ],
    ));

    assert!(minimise(&mut program));
    assert!(program.clauses.is_empty());
}

// Singleton fold: c(X; l) :- b(X; l). with no I/O on c folds onto an
// equivalent singleton, and references follow.
#[test]
fn test_singleton_relations_fold_and_rewrite() {
    let mut program = Program::new();
    program.add_relation(Relation::new("b".into()));
    program.add_relation(Relation::new("c".into()));
    program.add_relation(Relation::new("c2".into()));
    program.add_relation(Relation::new("out".into()));
    program.add_directive(Directive::new(DirectiveKind::Output, "out".into()));

    program.add_clause(rule(
        atom("c", vec![var("X")], vec![var("l")]),
        vec![pos("b", vec![var("X")], vec![var("l")])],
    ));
    program.add_clause(rule(
        atom("c2", vec![var("Y")], vec![var("m")]),
        vec![pos("b", vec![var("Y")], vec![var("m")])],
    ));
    program.add_clause(rule(
        atom("out", vec![var("V")], vec![]),
        vec![pos("c2", vec![var("V")], vec![var("W")])],
    ));

    assert!(minimise(&mut program));

    // c2 folds onto c; out's body follows the canonical name
    assert!(program.relation(&"c2".into()).is_none());
    assert!(program.relation(&"c".into()).is_some());
    let out_clauses = program.clauses_of(&"out".into());
    assert_eq!(out_clauses.len(), 1);
    assert_eq!(out_clauses[0].to_string(), "out(V) :- c(V; W).");
}

// Size monotonicity across the full pipeline.
#[test]
fn test_minimisation_is_size_monotone() {
    let mut program = Program::new();
    program.add_relation(Relation::new("p".into()));
    program.add_relation(Relation::new("q".into()));
    for _ in 0..3 {
        program.add_clause(rule(
            atom("p", vec![var("X")], vec![]),
            vec![pos("q", vec![var("X")], vec![])],
        ));
    }
    program.add_clause(Clause::fact(atom("q", vec![num("1")], vec![])));

    let clauses_before = program.clauses.len();
    let relations_before = program.relations.len();
    minimise(&mut program);

    assert!(program.clauses.len() <= clauses_before);
    assert!(program.relations.len() <= relations_before);
}

// A full pipeline run composes minimisation and reordering to a fixed
// point of observable progress.
#[test]
fn test_pipeline_reaches_fixed_point() {
    use datalog_transform::ReorderLiterals;

    let mut program = Program::new();
    program.add_clause(rule(
        atom("p", vec![var("X")], vec![]),
        vec![
            pos("q", vec![var("X")], vec![]),
            pos("q", vec![var("X")], vec![]),
        ],
    ));
    program.add_clause(rule(
        atom("p", vec![var("A")], vec![]),
        vec![pos("q", vec![var("A")], vec![])],
    ));

    let mut ctx = TransformContext::new(TransformConfig::default());
    let mut pipeline = TransformerPipeline::new()
        .add(Box::new(MinimiseProgram::new()))
        .add(Box::new(ReorderLiterals::new()));

    assert!(pipeline.run_to_fixpoint(&mut program, &mut ctx));
    assert_eq!(program.clauses.len(), 1);

    // a second full run finds nothing left to do
    assert!(!pipeline.run_to_fixpoint(&mut program, &mut ctx));
}
