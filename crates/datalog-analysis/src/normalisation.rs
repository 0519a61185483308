//! Clause normalisation: a canonical element list for each clause.
//!
//! The normal form abstracts away variable names and the order of body
//! literals while preserving constants textually. Element 0 is always the
//! head under the reserved name `@min:head`; body literals follow in source
//! order, tagged with the scope they occur in (`@min:scope:0` for the clause
//! body, a fresh scope per aggregator).

use datalog_ast::{Argument, ArgumentKind, Atom, Clause, Literal, Program, QualifiedName};
use std::collections::BTreeSet;
use std::fmt;

/// One element of a normalised clause: a name derived from the literal
/// shape, plus the normalised parameter strings split into concrete and
/// lattice positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalisedElement {
    pub name: QualifiedName,
    pub concrete_params: Vec<String>,
    pub lattice_params: Vec<String>,
}

/// The canonical form of a clause.
///
/// Constants are preserved textually: `1` and `01` normalise to distinct
/// constant identifiers and never unify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalisedClause {
    fully_normalised: bool,
    aggr_scope_count: usize,
    unnamed_count: usize,
    variables: BTreeSet<String>,
    constants: BTreeSet<String>,
    elements: Vec<NormalisedElement>,
}

impl NormalisedClause {
    pub fn new(clause: &Clause) -> Self {
        let mut norm = NormalisedClause {
            fully_normalised: true,
            aggr_scope_count: 0,
            unnamed_count: 0,
            variables: BTreeSet::new(),
            constants: BTreeSet::new(),
            elements: Vec::new(),
        };

        // head
        let concrete_head: Vec<String> = clause
            .head
            .concrete
            .iter()
            .map(|arg| norm.normalise_argument(arg))
            .collect();
        let lattice_head: Vec<String> = clause
            .head
            .lattice
            .iter()
            .map(|arg| norm.normalise_argument(arg))
            .collect();
        norm.elements.push(NormalisedElement {
            name: QualifiedName::new("@min:head"),
            concrete_params: concrete_head,
            lattice_params: lattice_head,
        });

        // body
        for lit in &clause.body {
            norm.add_body_literal("@min:scope:0", lit);
        }

        norm
    }

    pub fn is_fully_normalised(&self) -> bool {
        self.fully_normalised
    }

    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn constants(&self) -> &BTreeSet<String> {
        &self.constants
    }

    pub fn elements(&self) -> &[NormalisedElement] {
        &self.elements
    }

    fn add_atom(&mut self, qualifier: &str, scope_id: &str, atom: &Atom) {
        let concrete: Vec<String> = std::iter::once(scope_id.to_string())
            .chain(atom.concrete.iter().map(|arg| self.normalise_argument(arg)))
            .collect();
        let lattice: Vec<String> = std::iter::once(scope_id.to_string())
            .chain(atom.lattice.iter().map(|arg| self.normalise_argument(arg)))
            .collect();

        let mut name = atom.name.clone();
        name.prepend(qualifier);
        self.elements.push(NormalisedElement {
            name,
            concrete_params: concrete,
            lattice_params: lattice,
        });
    }

    fn add_body_literal(&mut self, scope_id: &str, lit: &Literal) {
        match lit {
            Literal::Atom(atom) => self.add_atom("@min:atom", scope_id, atom),
            Literal::Negation(neg) => self.add_atom("@min:neg", scope_id, &neg.atom),
            Literal::Constraint(bc) => {
                let params = vec![
                    scope_id.to_string(),
                    self.normalise_argument(&bc.lhs),
                    self.normalise_argument(&bc.rhs),
                ];
                let mut name = QualifiedName::new(bc.op.symbol());
                name.prepend("@min:operator");
                self.elements.push(NormalisedElement {
                    name,
                    concrete_params: params,
                    lattice_params: Vec::new(),
                });
            }
        }
    }

    fn normalise_argument(&mut self, arg: &Argument) -> String {
        match &arg.kind {
            ArgumentKind::StringConstant(text) => {
                let name = format!("@min:cst:str\"{}\"", text);
                self.constants.insert(name.clone());
                name
            }
            ArgumentKind::NumericConstant(num) => {
                let name = format!("@min:cst:num:{}", num);
                self.constants.insert(name.clone());
                name
            }
            ArgumentKind::NilConstant => {
                self.constants.insert("@min:cst:nil".to_string());
                "@min:cst:nil".to_string()
            }
            ArgumentKind::Variable(var) => {
                let name = var.as_ref().clone();
                self.variables.insert(name.clone());
                name
            }
            ArgumentKind::UnnamedVariable => {
                let name = format!("@min:unnamed:{}", self.unnamed_count);
                self.unnamed_count += 1;
                self.variables.insert(name.clone());
                name
            }
            ArgumentKind::Aggregator { op, target, body } => {
                // a fresh scope uniquely identifies the aggregator
                self.aggr_scope_count += 1;
                let scope_id = format!("@min:scope:{}", self.aggr_scope_count);
                self.variables.insert(scope_id.clone());

                // the operator is fixed; the scope and the target expression
                // can be remapped as variables
                let mut components = vec![scope_id.clone()];
                if let Some(target) = target {
                    components.push(self.normalise_argument(target));
                }
                self.elements.push(NormalisedElement {
                    name: QualifiedName::new(format!("@min:aggrtype:{}", op)),
                    concrete_params: components,
                    lattice_params: Vec::new(),
                });

                for lit in body {
                    self.add_body_literal(&scope_id, lit);
                }

                scope_id
            }
            ArgumentKind::RecordInit(_)
            | ArgumentKind::IntrinsicFunctor { .. }
            | ArgumentKind::UserFunctor { .. } => {
                self.fully_normalised = false;
                "@min:unhandled:arg".to_string()
            }
        }
    }
}

impl fmt::Display for NormalisedClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, el) in self.elements.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}:[{}] [{}]",
                el.name,
                el.concrete_params.join(","),
                el.lattice_params.join(",")
            )?;
        }
        write!(f, "}}")
    }
}

/// Per-program cache of clause normalisations, indexed in step with
/// `program.clauses`. Rebuilt whenever a transformer invalidates analyses.
#[derive(Debug, Clone, Default)]
pub struct ClauseNormalisationAnalysis {
    normalisations: Vec<NormalisedClause>,
}

impl ClauseNormalisationAnalysis {
    pub const NAME: &'static str = "clause-normalisation";

    pub fn run(program: &Program) -> Self {
        ClauseNormalisationAnalysis {
            normalisations: program.clauses.iter().map(NormalisedClause::new).collect(),
        }
    }

    /// The normalisation of the clause at the given index into
    /// `program.clauses`
    pub fn normalisation(&self, clause_index: usize) -> &NormalisedClause {
        &self.normalisations[clause_index]
    }

    pub fn len(&self) -> usize {
        self.normalisations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalisations.is_empty()
    }

    /// Debug dump in the `Normalise(clause) = {...}` shape
    pub fn report(&self, program: &Program) -> String {
        let mut out = String::new();
        for (clause, norm) in program.clauses.iter().zip(&self.normalisations) {
            out.push_str(&format!("Normalise({}) = {}\n", clause, norm));
        }
        out
    }
}
