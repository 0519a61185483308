//! The Relational Algebra Machine (RAM) intermediate representation
//!
//! The imperative IR the lowering emits: relations with split concrete and
//! lattice arities, expressions over tuple environments, conditions
//! (existence checks, constraints, lattice leq), nested operations (scans,
//! unpacks, aggregates, filters), and the outermost statements.

mod expression;
mod operation;
mod relation;

pub use expression::{AggregateFunction, Condition, Expression};
pub use operation::{Operation, Statement};
pub use relation::RamRelation;
