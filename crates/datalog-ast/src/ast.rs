//! Core term-level AST: arguments, literals, and clauses.
//!
//! All nodes carry a [`Span`]; structural equality and hashing ignore it, so
//! two nodes parsed from different places compare equal when their shapes do.

use crate::{QualifiedName, Span, Symbol};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Type tag a numeric constant acquires after type inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    Int,
    Uint,
    Float,
}

/// A numeric constant, kept as its literal text until type inference fixes
/// its final type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericConstant {
    pub text: String,
    pub ty: Option<NumericType>,
}

impl NumericConstant {
    pub fn new(text: impl Into<String>) -> Self {
        NumericConstant {
            text: text.into(),
            ty: None,
        }
    }

    pub fn with_type(text: impl Into<String>, ty: NumericType) -> Self {
        NumericConstant {
            text: text.into(),
            ty: Some(ty),
        }
    }
}

impl fmt::Display for NumericConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        match self.ty {
            Some(NumericType::Uint) => write!(f, "u"),
            Some(NumericType::Float) => write!(f, "f"),
            _ => Ok(()),
        }
    }
}

/// Intrinsic functor operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Neg,
    Band,
    Bor,
    Bxor,
    Bnot,
    Land,
    Lor,
    Lnot,
    Max,
    Min,
    Cat,
    Ord,
    Strlen,
    Substr,
    ToNumber,
    ToString,
    Range,
    Urange,
    Frange,
}

impl IntrinsicOp {
    /// Symbolic binary operators print infix
    pub fn is_infix(&self) -> bool {
        matches!(
            self,
            IntrinsicOp::Add
                | IntrinsicOp::Sub
                | IntrinsicOp::Mul
                | IntrinsicOp::Div
                | IntrinsicOp::Mod
                | IntrinsicOp::Pow
                | IntrinsicOp::Band
                | IntrinsicOp::Bor
                | IntrinsicOp::Bxor
                | IntrinsicOp::Land
                | IntrinsicOp::Lor
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            IntrinsicOp::Add => "+",
            IntrinsicOp::Sub => "-",
            IntrinsicOp::Mul => "*",
            IntrinsicOp::Div => "/",
            IntrinsicOp::Mod => "%",
            IntrinsicOp::Pow => "^",
            IntrinsicOp::Neg => "-",
            IntrinsicOp::Band => "band",
            IntrinsicOp::Bor => "bor",
            IntrinsicOp::Bxor => "bxor",
            IntrinsicOp::Bnot => "bnot",
            IntrinsicOp::Land => "land",
            IntrinsicOp::Lor => "lor",
            IntrinsicOp::Lnot => "lnot",
            IntrinsicOp::Max => "max",
            IntrinsicOp::Min => "min",
            IntrinsicOp::Cat => "cat",
            IntrinsicOp::Ord => "ord",
            IntrinsicOp::Strlen => "strlen",
            IntrinsicOp::Substr => "substr",
            IntrinsicOp::ToNumber => "to_number",
            IntrinsicOp::ToString => "to_string",
            IntrinsicOp::Range => "range",
            IntrinsicOp::Urange => "urange",
            IntrinsicOp::Frange => "frange",
        }
    }
}

impl fmt::Display for IntrinsicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Aggregate operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Min,
    Max,
    Count,
    Sum,
    Mean,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Count => "count",
            AggregateOp::Sum => "sum",
            AggregateOp::Mean => "mean",
        };
        write!(f, "{}", text)
    }
}

/// Binary constraint operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ConstraintOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ConstraintOp::Eq => "=",
            ConstraintOp::Ne => "!=",
            ConstraintOp::Lt => "<",
            ConstraintOp::Le => "<=",
            ConstraintOp::Gt => ">",
            ConstraintOp::Ge => ">=",
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The shape of an argument, without its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// Named variable: `X`
    Variable(Symbol),
    /// Anonymous variable: `_`
    UnnamedVariable,
    /// Numeric constant: `42`, `3.14`, `1u`
    NumericConstant(NumericConstant),
    /// String constant: `"abc"`
    StringConstant(String),
    /// The empty record: `nil`
    NilConstant,
    /// Record constructor: `[a, b, c]`
    RecordInit(Vec<Argument>),
    /// Intrinsic functor application: `X + Y`, `cat(A, B)`
    IntrinsicFunctor {
        op: IntrinsicOp,
        args: Vec<Argument>,
    },
    /// User-defined functor application: `@f(X)`
    UserFunctor { name: Symbol, args: Vec<Argument> },
    /// Aggregator: `min X : { body }`
    Aggregator {
        op: AggregateOp,
        target: Option<Box<Argument>>,
        body: Vec<Literal>,
    },
}

/// An argument together with its source location
#[derive(Debug, Clone)]
pub struct Argument {
    pub kind: ArgumentKind,
    pub span: Span,
}

impl Argument {
    pub fn new(kind: ArgumentKind, span: Span) -> Self {
        Argument { kind, span }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, ArgumentKind::Variable(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self.kind,
            ArgumentKind::NumericConstant(_)
                | ArgumentKind::StringConstant(_)
                | ArgumentKind::NilConstant
        )
    }

    /// The variable name, if this argument is a named variable
    pub fn as_variable(&self) -> Option<&Symbol> {
        match &self.kind {
            ArgumentKind::Variable(name) => Some(name),
            _ => None,
        }
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Argument {}

impl Hash for Argument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ArgumentKind::Variable(name) => write!(f, "{}", name),
            ArgumentKind::UnnamedVariable => write!(f, "_"),
            ArgumentKind::NumericConstant(num) => write!(f, "{}", num),
            ArgumentKind::StringConstant(text) => write!(f, "\"{}\"", text),
            ArgumentKind::NilConstant => write!(f, "nil"),
            ArgumentKind::RecordInit(args) => {
                write!(f, "[")?;
                write_joined(f, args)?;
                write!(f, "]")
            }
            ArgumentKind::IntrinsicFunctor { op, args } => {
                if op.is_infix() && args.len() == 2 {
                    write!(f, "({} {} {})", args[0], op, args[1])
                } else {
                    write!(f, "{}(", op)?;
                    write_joined(f, args)?;
                    write!(f, ")")
                }
            }
            ArgumentKind::UserFunctor { name, args } => {
                write!(f, "@{}(", name)?;
                write_joined(f, args)?;
                write!(f, ")")
            }
            ArgumentKind::Aggregator { op, target, body } => {
                write!(f, "{}", op)?;
                if let Some(target) = target {
                    write!(f, " {}", target)?;
                }
                write!(f, " : {{ ")?;
                write_joined(f, body)?;
                write!(f, " }}")
            }
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// A relation reference with separate concrete and lattice argument lists:
/// `R(c1, ..., ck; l1, ..., lm)`
#[derive(Debug, Clone)]
pub struct Atom {
    pub name: QualifiedName,
    pub concrete: Vec<Argument>,
    pub lattice: Vec<Argument>,
    pub span: Span,
}

impl Atom {
    pub fn new(name: QualifiedName, concrete: Vec<Argument>, lattice: Vec<Argument>) -> Self {
        Atom {
            name,
            concrete,
            lattice,
            span: Span::unknown(),
        }
    }

    pub fn concrete_arity(&self) -> usize {
        self.concrete.len()
    }

    pub fn lattice_arity(&self) -> usize {
        self.lattice.len()
    }

    /// An atom with no concrete arguments
    pub fn is_proposition(&self) -> bool {
        self.concrete.is_empty()
    }

    /// All arguments, concrete then lattice
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.concrete.iter().chain(self.lattice.iter())
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.concrete == other.concrete && self.lattice == other.lattice
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.concrete.hash(state);
        self.lattice.hash(state);
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_joined(f, &self.concrete)?;
        if !self.lattice.is_empty() {
            write!(f, "; ")?;
            write_joined(f, &self.lattice)?;
        }
        write!(f, ")")
    }
}

/// A negated atom: `!R(...)`
#[derive(Debug, Clone)]
pub struct Negation {
    pub atom: Atom,
    pub span: Span,
}

impl Negation {
    pub fn new(atom: Atom) -> Self {
        Negation {
            atom,
            span: Span::unknown(),
        }
    }
}

impl PartialEq for Negation {
    fn eq(&self, other: &Self) -> bool {
        self.atom == other.atom
    }
}

impl Eq for Negation {}

impl Hash for Negation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.atom.hash(state);
    }
}

impl fmt::Display for Negation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.atom)
    }
}

/// A binary constraint between two arguments: `X < Y`
#[derive(Debug, Clone)]
pub struct BinaryConstraint {
    pub op: ConstraintOp,
    pub lhs: Argument,
    pub rhs: Argument,
    pub span: Span,
}

impl BinaryConstraint {
    pub fn new(op: ConstraintOp, lhs: Argument, rhs: Argument) -> Self {
        BinaryConstraint {
            op,
            lhs,
            rhs,
            span: Span::unknown(),
        }
    }
}

impl PartialEq for BinaryConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.lhs == other.lhs && self.rhs == other.rhs
    }
}

impl Eq for BinaryConstraint {}

impl Hash for BinaryConstraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.op.hash(state);
        self.lhs.hash(state);
        self.rhs.hash(state);
    }
}

impl fmt::Display for BinaryConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

/// A body literal: a positive atom, a negated atom, or a binary constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Atom(Atom),
    Negation(Negation),
    Constraint(BinaryConstraint),
}

impl Literal {
    /// The underlying atom for positive and negated literals
    pub fn atom(&self) -> Option<&Atom> {
        match self {
            Literal::Atom(atom) => Some(atom),
            Literal::Negation(neg) => Some(&neg.atom),
            Literal::Constraint(_) => None,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Literal::Atom(_))
    }

    pub fn is_negation(&self) -> bool {
        matches!(self, Literal::Negation(_))
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, Literal::Constraint(_))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Atom(atom) => write!(f, "{}", atom),
            Literal::Negation(neg) => write!(f, "{}", neg),
            Literal::Constraint(bc) => write!(f, "{}", bc),
        }
    }
}

/// A fixed evaluation order for each version of a clause, as written with
/// `.plan`. Surface orderings are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExecutionPlan {
    pub orders: BTreeMap<u32, Vec<u32>>,
}

impl ExecutionPlan {
    pub fn order_for(&self, version: u32) -> Option<&Vec<u32>> {
        self.orders.get(&version)
    }
}

/// A Horn clause: `head :- body.`; a fact when the body is empty
#[derive(Debug, Clone)]
pub struct Clause {
    pub head: Atom,
    pub body: Vec<Literal>,
    pub plan: Option<ExecutionPlan>,
    pub span: Span,
}

impl Clause {
    pub fn new(head: Atom, body: Vec<Literal>) -> Self {
        Clause {
            head,
            body,
            plan: None,
            span: Span::unknown(),
        }
    }

    pub fn fact(head: Atom) -> Self {
        Clause::new(head, Vec::new())
    }

    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_rule(&self) -> bool {
        !self.body.is_empty()
    }

    /// The positive atoms of the body, in source order
    pub fn body_atoms(&self) -> Vec<&Atom> {
        self.body
            .iter()
            .filter_map(|lit| match lit {
                Literal::Atom(atom) => Some(atom),
                _ => None,
            })
            .collect()
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.body == other.body && self.plan == other.plan
    }
}

impl Eq for Clause {}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            write_joined(f, &self.body)?;
        }
        write!(f, ".")
    }
}
