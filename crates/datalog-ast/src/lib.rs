//! Abstract Syntax Tree (AST) definitions for a lattice-extended Datalog
//!
//! This crate defines the core data structures representing a Datalog program
//! whose relations may carry lattice-typed attributes, together with the
//! surrounding bookkeeping the middle-end needs.
//!
//! # Key Components
//!
//! - **Program**: relations, clauses, lattices, and all other declarations
//! - **Clause**: a fact or a rule with a head atom and body literals
//! - **Atom**: a relation reference `R(c1, ..., ck; l1, ..., lm)` with
//!   separate concrete and lattice argument lists
//! - **Argument**: variables, constants, records, functors, aggregators
//! - **ProgramBuilder**: the surface the parser drives to assemble a
//!   program, reporting redefinitions as diagnostics
//!
//! # Syntax Examples
//!
//! - **Facts**: `edge(1, 2).`
//! - **Rules**: `path(X, Z) :- edge(X, Y), path(Y, Z).`
//! - **Lattice relations**: `dist(X, Y; D) :- edge(X, Y; D).`
//! - **Lattice declarations**: `.lattice Min <number, leq, lub, glb, bot, top>`

mod ast;
mod builder;
mod decls;
mod lattice;
mod name;
mod program;
mod relation;
mod report;
mod span;
pub mod utility;

use internment::Intern;

/// Interned string for efficient storage and comparison
pub type Symbol = Intern<String>;

pub use ast::{
    AggregateOp, Argument, ArgumentKind, Atom, BinaryConstraint, Clause, ConstraintOp,
    ExecutionPlan, IntrinsicOp, Literal, Negation, NumericConstant, NumericType,
};
pub use builder::ProgramBuilder;
pub use decls::{
    Component, ComponentInit, Directive, DirectiveKind, FunctorDecl, Pragma, TypeDecl,
    TypeDeclKind,
};
pub use lattice::Lattice;
pub use name::QualifiedName;
pub use program::Program;
pub use relation::{
    Attribute, LatticeAttribute, Relation, RelationQualifier, RelationRepresentation, RelationTag,
};
pub use report::{Diagnostic, DiagnosticMessage, ErrorReport, Severity};
pub use span::{Span, SrcId};
