//! RAM expressions and conditions.

use datalog_ast::{ConstraintOp, QualifiedName};
use std::fmt;

/// A value computed inside a tuple environment
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Access an element of tuple `tuple_id`; lattice elements print as
    /// `l<id>.<elem>`, concrete elements as `t<id>.<elem>`
    TupleElement {
        tuple_id: usize,
        element: usize,
        lattice: bool,
    },
    SignedConstant(i64),
    UnsignedConstant(u64),
    FloatConstant(f64),
    /// Pack a record value from field expressions
    PackRecord(Vec<Expression>),
    /// An intrinsic functor application
    IntrinsicOperator {
        op: datalog_ast::IntrinsicOp,
        args: Vec<Expression>,
    },
    /// A user-defined functor application
    UserOperator {
        name: String,
        args: Vec<Expression>,
    },
    /// An unconstrained position in a pattern
    Undef,
}

impl Expression {
    pub fn concrete_element(tuple_id: usize, element: usize) -> Self {
        Expression::TupleElement {
            tuple_id,
            element,
            lattice: false,
        }
    }

    pub fn lattice_element(tuple_id: usize, element: usize) -> Self {
        Expression::TupleElement {
            tuple_id,
            element,
            lattice: true,
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Expression::Undef)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::TupleElement {
                tuple_id,
                element,
                lattice,
            } => {
                let tag = if *lattice { "l" } else { "t" };
                write!(f, "{}{}.{}", tag, tuple_id, element)
            }
            Expression::SignedConstant(value) => write!(f, "number({})", value),
            Expression::UnsignedConstant(value) => write!(f, "unsigned({})", value),
            Expression::FloatConstant(value) => write!(f, "float({})", value),
            Expression::PackRecord(args) => {
                write!(f, "[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
            Expression::IntrinsicOperator { op, args } => {
                write!(f, "({}", op)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expression::UserOperator { name, args } => {
                write!(f, "@{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Undef => write!(f, "_"),
        }
    }
}

/// Aggregate functions over a scanned relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Min,
    Max,
    Count,
    Sum,
    Mean,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Mean => "MEAN",
        };
        write!(f, "{}", text)
    }
}

/// A boolean condition evaluated inside a tuple environment
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    True,
    Conjunction(Box<Condition>, Box<Condition>),
    Negation(Box<Condition>),
    /// A binary constraint between two expressions
    Constraint {
        op: ConstraintOp,
        lhs: Expression,
        rhs: Expression,
    },
    /// Is the relation empty?
    EmptinessCheck { relation: String },
    /// Does a tuple matching the pattern exist? `Undef` positions are
    /// wildcards; concrete and lattice patterns are kept apart.
    ExistenceCheck {
        relation: String,
        concrete_pattern: Vec<Expression>,
        lattice_pattern: Vec<Expression>,
    },
    /// Lattice partial-order comparison under the named lattice's `leq`
    LeqConstraint {
        lattice: QualifiedName,
        lhs: Expression,
        rhs: Expression,
    },
}

impl Condition {
    /// Conjoin with another condition, absorbing `True`
    pub fn and(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::True, other) => other,
            (cond, Condition::True) => cond,
            (lhs, rhs) => Condition::Conjunction(Box::new(lhs), Box::new(rhs)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => write!(f, "true"),
            Condition::Conjunction(lhs, rhs) => write!(f, "({} AND {})", lhs, rhs),
            Condition::Negation(inner) => write!(f, "(NOT {})", inner),
            Condition::Constraint { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Condition::EmptinessCheck { relation } => write!(f, "({} = ∅)", relation),
            Condition::ExistenceCheck {
                relation,
                concrete_pattern,
                lattice_pattern,
            } => {
                write!(f, "(")?;
                for (i, expr) in concrete_pattern.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", expr)?;
                }
                if !lattice_pattern.is_empty() {
                    write!(f, "; ")?;
                    for (i, expr) in lattice_pattern.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", expr)?;
                    }
                }
                write!(f, ") IN {}", relation)
            }
            Condition::LeqConstraint { lattice, lhs, rhs } => {
                write!(f, "({} [{}]<= {})", lhs, lattice, rhs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_element_display() {
        assert_eq!(Expression::concrete_element(0, 1).to_string(), "t0.1");
        assert_eq!(Expression::lattice_element(2, 0).to_string(), "l2.0");
    }

    #[test]
    fn test_existence_check_display() {
        let cond = Condition::ExistenceCheck {
            relation: "dist".to_string(),
            concrete_pattern: vec![
                Expression::concrete_element(0, 0),
                Expression::Undef,
            ],
            lattice_pattern: vec![Expression::lattice_element(0, 0)],
        };
        assert_eq!(cond.to_string(), "(t0.0,_; l0.0) IN dist");
    }

    #[test]
    fn test_leq_constraint_display() {
        let cond = Condition::LeqConstraint {
            lattice: "Min".into(),
            lhs: Expression::lattice_element(0, 0),
            rhs: Expression::lattice_element(1, 0),
        };
        assert_eq!(cond.to_string(), "(l0.0 [Min]<= l1.0)");
    }

    #[test]
    fn test_and_absorbs_true() {
        let check = Condition::EmptinessCheck {
            relation: "p".to_string(),
        };
        assert_eq!(Condition::True.and(check.clone()), check);
        assert_eq!(check.clone().and(Condition::True), check);
    }
}
