//! End-to-end lowering scenarios: minimise, reorder, then emit RAM.

use crate::common::{atom, num, pos, rule, var};
use datalog_ast::{
    Argument, ArgumentKind, BinaryConstraint, ConstraintOp, Literal, NumericConstant,
    NumericType, Program, Span,
};
use datalog_ast2ram::{ClauseTranslator, SymbolTable};
use datalog_ram::Statement;
use datalog_transform::{
    MinimiseProgram, SipsStrategy, TransformConfig, TransformContext, Transformer,
};

fn int(text: &str) -> Argument {
    Argument::new(
        ArgumentKind::NumericConstant(NumericConstant::with_type(text, NumericType::Int)),
        Span::unknown(),
    )
}

fn lower_program(program: &Program, sips: SipsStrategy) -> Vec<Statement> {
    let mut symbols = SymbolTable::new();
    program
        .clauses
        .iter()
        .map(|clause| {
            ClauseTranslator::new(sips, &mut symbols)
                .translate(clause, 0)
                .expect("clause lowers")
        })
        .collect()
}

// The minimised program lowers one statement per surviving clause.
#[test]
fn test_minimise_then_lower() {
    let mut program = Program::new();
    program.add_clause(rule(
        atom("path", vec![var("X"), var("Y")], vec![]),
        vec![pos("edge", vec![var("X"), var("Y")], vec![])],
    ));
    program.add_clause(rule(
        atom("path", vec![var("A"), var("B")], vec![]),
        vec![pos("edge", vec![var("A"), var("B")], vec![])],
    ));

    let mut ctx = TransformContext::new(TransformConfig::default());
    MinimiseProgram::new().apply(&mut program, &mut ctx);
    assert_eq!(program.clauses.len(), 1);

    let statements = lower_program(&program, SipsStrategy::AllBound);
    assert_eq!(statements.len(), 1);
    let printed = statements[0].to_string();
    assert!(printed.contains("FOR t0 IN edge"));
    assert!(printed.contains("PROJECT (t0.0, t0.1) INTO path"));
}

// The lowering invokes the same SIPS reordering the transformer uses: a
// pre-bound variable pulls the fully bound atom to the outermost scan.
#[test]
fn test_lowering_reorders_with_sips() {
    let clause = rule(
        atom("h", vec![var("X"), var("Y")], vec![]),
        vec![
            pos("p", vec![var("X"), var("Y")], vec![]),
            pos("q", vec![var("X")], vec![]),
            Literal::Constraint(BinaryConstraint::new(ConstraintOp::Eq, var("X"), int("3"))),
        ],
    );

    let mut symbols = SymbolTable::new();
    let statement = ClauseTranslator::new(SipsStrategy::AllBound, &mut symbols)
        .translate(&clause, 0)
        .expect("clause lowers");
    let printed = statement.to_string();

    // q is scanned first under all-bound, so it owns tuple id 0
    assert!(printed.contains("FOR t0 IN q"), "got:\n{}", printed);
    assert!(printed.contains("FOR t1 IN p"), "got:\n{}", printed);
}

// Lattice-carrying rules keep the concrete/lattice split through the whole
// stack: equality filters on lattice positions use lattice tuple elements.
#[test]
fn test_lattice_split_survives_lowering() {
    let clause = rule(
        atom("shortest", vec![var("X")], vec![var("D")]),
        vec![
            pos("dist", vec![var("X")], vec![var("D")]),
            pos("dist", vec![var("X")], vec![var("D")]),
        ],
    );

    // duplicate literal first disappears in minimisation
    let mut program = Program::new();
    program.add_clause(clause);
    let mut ctx = TransformContext::new(TransformConfig::default());
    MinimiseProgram::new().apply(&mut program, &mut ctx);
    assert_eq!(program.clauses[0].body.len(), 1);

    let statements = lower_program(&program, SipsStrategy::AllBound);
    let printed = statements[0].to_string();
    assert!(printed.contains("PROJECT (t0.0; l0.0) INTO shortest"));
}

// Facts with mixed constants lower to direct projections.
#[test]
fn test_fact_batch_lowering() {
    let mut program = Program::new();
    program.add_clause(datalog_ast::Clause::fact(atom(
        "edge",
        vec![int("1"), int("2")],
        vec![int("7")],
    )));
    program.add_clause(datalog_ast::Clause::fact(atom(
        "edge",
        vec![int("2"), int("3")],
        vec![int("9")],
    )));

    let statements = lower_program(&program, SipsStrategy::AllBound);
    let batch = Statement::Sequence(statements);
    let printed = batch.to_string();
    assert!(printed.contains("PROJECT (number(1), number(2); number(7)) INTO edge"));
    assert!(printed.contains("PROJECT (number(2), number(3); number(9)) INTO edge"));
}

// A numeric constant that never got a final type is reported, not
// silently mistranslated.
#[test]
fn test_untyped_constant_reported() {
    let mut program = Program::new();
    program.add_clause(datalog_ast::Clause::fact(atom("p", vec![num("1")], vec![])));

    let mut symbols = SymbolTable::new();
    let result = ClauseTranslator::new(SipsStrategy::AllBound, &mut symbols)
        .translate(&program.clauses[0], 0);
    assert!(result.is_err());
}
