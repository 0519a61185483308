//! RAM operations and statements.

use crate::{AggregateFunction, Condition, Expression};
use datalog_ast::IntrinsicOp;
use std::fmt;

/// A nested tuple operation. Each layer introduces or constrains a tuple
/// environment and drives an inner operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Iterate every tuple of a relation
    Scan {
        relation: String,
        tuple_id: usize,
        inner: Box<Operation>,
    },
    /// Iterate the tuples matching an index pattern
    IndexScan {
        relation: String,
        tuple_id: usize,
        concrete_pattern: Vec<Expression>,
        lattice_pattern: Vec<Expression>,
        inner: Box<Operation>,
    },
    /// Unpack a record value into a fresh tuple environment
    UnpackRecord {
        expr: Expression,
        tuple_id: usize,
        arity: usize,
        inner: Box<Operation>,
    },
    /// Compute an aggregate over the tuples of a relation satisfying a
    /// condition
    Aggregate {
        function: AggregateFunction,
        relation: String,
        tuple_id: usize,
        expr: Expression,
        condition: Condition,
        inner: Box<Operation>,
    },
    /// Evaluate a multi-result intrinsic, one tuple per result
    NestedIntrinsic {
        op: IntrinsicOp,
        args: Vec<Expression>,
        tuple_id: usize,
        inner: Box<Operation>,
    },
    /// Run the inner operation only when the condition holds
    Filter {
        condition: Condition,
        inner: Box<Operation>,
    },
    /// Stop iterating the enclosing scan when the condition holds
    Break {
        condition: Condition,
        inner: Box<Operation>,
    },
    /// Project a tuple into the target relation, with split concrete and
    /// lattice expression vectors
    Project {
        relation: String,
        concrete_exprs: Vec<Expression>,
        lattice_exprs: Vec<Expression>,
    },
}

impl Operation {
    fn fmt_indent(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);
        match self {
            Operation::Scan {
                relation,
                tuple_id,
                inner,
            } => {
                writeln!(f, "{}FOR t{} IN {}", pad, tuple_id, relation)?;
                inner.fmt_indent(f, indent + 1)
            }
            Operation::IndexScan {
                relation,
                tuple_id,
                concrete_pattern,
                lattice_pattern,
                inner,
            } => {
                write!(f, "{}SEARCH t{} IN {} ON INDEX (", pad, tuple_id, relation)?;
                write_exprs(f, concrete_pattern)?;
                if !lattice_pattern.is_empty() {
                    write!(f, "; ")?;
                    write_exprs(f, lattice_pattern)?;
                }
                writeln!(f, ")")?;
                inner.fmt_indent(f, indent + 1)
            }
            Operation::UnpackRecord {
                expr,
                tuple_id,
                arity,
                inner,
            } => {
                writeln!(f, "{}UNPACK t{} ARITY {} FROM {}", pad, tuple_id, arity, expr)?;
                inner.fmt_indent(f, indent + 1)
            }
            Operation::Aggregate {
                function,
                relation,
                tuple_id,
                expr,
                condition,
                inner,
            } => {
                writeln!(
                    f,
                    "{}t{}.0 = {} {} FOR ALL t{} IN {} WHERE {}",
                    pad, tuple_id, function, expr, tuple_id, relation, condition
                )?;
                inner.fmt_indent(f, indent + 1)
            }
            Operation::NestedIntrinsic {
                op,
                args,
                tuple_id,
                inner,
            } => {
                write!(f, "{}t{}.0 = {}(", pad, tuple_id, op)?;
                write_exprs(f, args)?;
                writeln!(f, ")")?;
                inner.fmt_indent(f, indent + 1)
            }
            Operation::Filter { condition, inner } => {
                writeln!(f, "{}IF {}", pad, condition)?;
                inner.fmt_indent(f, indent + 1)
            }
            Operation::Break { condition, inner } => {
                writeln!(f, "{}BREAK IF {}", pad, condition)?;
                inner.fmt_indent(f, indent + 1)
            }
            Operation::Project {
                relation,
                concrete_exprs,
                lattice_exprs,
            } => {
                write!(f, "{}PROJECT (", pad)?;
                write_exprs(f, concrete_exprs)?;
                if !lattice_exprs.is_empty() {
                    write!(f, "; ")?;
                    write_exprs(f, lattice_exprs)?;
                }
                writeln!(f, ") INTO {}", relation)
            }
        }
    }
}

fn write_exprs(f: &mut fmt::Formatter<'_>, exprs: &[Expression]) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", expr)?;
    }
    Ok(())
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indent(f, 0)
    }
}

/// A RAM statement; every lowered clause becomes a `Query`
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(Operation),
    Sequence(Vec<Statement>),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Query(op) => {
                writeln!(f, "QUERY")?;
                op.fmt_indent(f, 1)
            }
            Statement::Sequence(statements) => {
                for statement in statements {
                    write!(f, "{}", statement)?;
                }
                Ok(())
            }
        }
    }
}
