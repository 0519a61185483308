//! Property-based tests for the normalisation and minimisation invariants.

use crate::common::{atom, rename_variables, rule};
use datalog_analysis::{are_bijectively_equivalent, NormalisedClause};
use datalog_ast::{
    Argument, ArgumentKind, Atom, Clause, Literal, Negation, NumericConstant, Program, Span,
};
use datalog_transform::{MinimiseProgram, TransformConfig, TransformContext, Transformer};
use internment::Intern;
use proptest::prelude::*;

fn arb_variable() -> impl Strategy<Value = Argument> {
    prop::sample::select(vec!["X", "Y", "Z", "W"]).prop_map(|name| {
        Argument::new(
            ArgumentKind::Variable(Intern::new(name.to_string())),
            Span::unknown(),
        )
    })
}

fn arb_constant() -> impl Strategy<Value = Argument> {
    prop::sample::select(vec!["0", "1", "2"]).prop_map(|text| {
        Argument::new(
            ArgumentKind::NumericConstant(NumericConstant::new(text)),
            Span::unknown(),
        )
    })
}

fn arb_argument() -> impl Strategy<Value = Argument> {
    prop_oneof![3 => arb_variable(), 1 => arb_constant()]
}

fn arb_atom() -> impl Strategy<Value = Atom> {
    (
        prop::sample::select(vec!["q", "r", "s"]),
        prop::collection::vec(arb_argument(), 1..3),
        prop::collection::vec(arb_argument(), 0..2),
    )
        .prop_map(|(name, concrete, lattice)| atom(name, concrete, lattice))
}

fn arb_literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        3 => arb_atom().prop_map(Literal::Atom),
        1 => arb_atom().prop_map(|a| Literal::Negation(Negation::new(a))),
    ]
}

fn arb_clause() -> impl Strategy<Value = Clause> {
    (
        prop::collection::vec(arb_variable(), 1..3),
        prop::collection::vec(arb_literal(), 1..4),
    )
        .prop_map(|(head_args, body)| rule(atom("p", head_args, vec![]), body))
}

fn arb_program() -> impl Strategy<Value = Program> {
    prop::collection::vec(arb_clause(), 1..5).prop_map(|clauses| {
        let mut program = Program::new();
        for clause in clauses {
            program.add_clause(clause);
        }
        program
    })
}

fn minimise(program: &mut Program) -> bool {
    let mut ctx = TransformContext::new(TransformConfig::default());
    MinimiseProgram::new().apply(program, &mut ctx)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Renaming every variable keeps the element names and the parameter
    // shapes; only the variable strings differ.
    #[test]
    fn prop_renaming_preserves_normal_form_shape(clause in arb_clause()) {
        let renamed = rename_variables(&clause, &|name| format!("{}__renamed", name));
        let norm = NormalisedClause::new(&clause);
        let norm_renamed = NormalisedClause::new(&renamed);

        prop_assert_eq!(norm.elements().len(), norm_renamed.elements().len());
        for (left, right) in norm.elements().iter().zip(norm_renamed.elements().iter()) {
            prop_assert_eq!(&left.name, &right.name);
            prop_assert_eq!(left.concrete_params.len(), right.concrete_params.len());
            prop_assert_eq!(left.lattice_params.len(), right.lattice_params.len());
        }
        prop_assert_eq!(norm.constants(), norm_renamed.constants());
    }

    // A clause is bijectively equivalent to any alpha-renaming of any
    // permutation of its body.
    #[test]
    fn prop_alpha_renamed_permutation_is_equivalent(
        (clause, permuted_body) in arb_clause().prop_flat_map(|clause| {
            let body = clause.body.clone();
            (Just(clause), Just(body).prop_shuffle())
        })
    ) {
        let mut permuted = clause.clone();
        permuted.body = permuted_body;
        let permuted = rename_variables(&permuted, &|name| format!("{}_0", name));

        let norm = NormalisedClause::new(&clause);
        let norm_permuted = NormalisedClause::new(&permuted);
        prop_assert!(are_bijectively_equivalent(&norm, &norm_permuted));
        prop_assert!(are_bijectively_equivalent(&norm_permuted, &norm));
    }

    // Clauses the normaliser cannot model never merge with anything,
    // including themselves.
    #[test]
    fn prop_unnormalisable_clauses_never_equivalent(clause in arb_clause()) {
        let mut degraded = clause.clone();
        degraded.body.push(Literal::Atom(atom(
            "q",
            vec![Argument::new(
                ArgumentKind::RecordInit(vec![]),
                Span::unknown(),
            )],
            vec![],
        )));

        let norm = NormalisedClause::new(&clause);
        let norm_degraded = NormalisedClause::new(&degraded);
        prop_assert!(!norm_degraded.is_fully_normalised());
        prop_assert!(!are_bijectively_equivalent(&norm_degraded, &norm_degraded.clone()));
        prop_assert!(!are_bijectively_equivalent(&norm, &norm_degraded));
        prop_assert!(!are_bijectively_equivalent(&norm_degraded, &norm));
    }

    // Minimisation never grows the program.
    #[test]
    fn prop_minimisation_is_size_monotone(mut program in arb_program()) {
        let clauses_before = program.clauses.len();
        let relations_before = program.relations.len();
        minimise(&mut program);
        prop_assert!(program.clauses.len() <= clauses_before);
        prop_assert!(program.relations.len() <= relations_before);
    }

    // Applying the pipeline twice produces what one application produced.
    #[test]
    fn prop_minimisation_is_idempotent(mut program in arb_program()) {
        minimise(&mut program);
        let after_first = program.clone();
        let changed_again = minimise(&mut program);
        prop_assert!(!changed_again);
        prop_assert_eq!(program, after_first);
    }

    // Every policy's ordering is a permutation of the body atoms.
    #[test]
    fn prop_sips_orderings_are_permutations(clause in arb_clause()) {
        use datalog_transform::{ordering_after_sips, SipsStrategy};

        let num_atoms = clause.body_atoms().len();
        for policy in [
            SipsStrategy::Naive,
            SipsStrategy::AllBound,
            SipsStrategy::MaxBound,
            SipsStrategy::MaxRatio,
            SipsStrategy::LeastFree,
            SipsStrategy::LeastFreeVars,
            SipsStrategy::Identity,
        ] {
            let ordering = ordering_after_sips(&policy, &clause);
            let mut sorted = ordering.clone();
            sorted.sort_unstable();
            let expected: Vec<usize> = (0..num_atoms).collect();
            prop_assert_eq!(sorted, expected, "{:?}", policy);
        }
    }
}
