//! The clause translator: one AST clause to one RAM statement.

use crate::{Location, SymbolTable, ValueIndex};
use datalog_analysis::FunctorAnalysis;
use datalog_ast::utility::{reorder_atoms, visit_constraints};
use datalog_ast::{
    AggregateOp, Argument, ArgumentKind, Atom, Clause, ConstraintOp, Literal, NumericConstant,
    NumericType,
};
use datalog_ram::{AggregateFunction, Condition, Expression, Operation, Statement};
use datalog_transform::{reorder_clause_with_sips, SipsStrategy};
use std::fmt;

/// Failures while lowering a clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// A numeric constant reached lowering without a final type
    UntypedNumericConstant { text: String },
    /// A numeric constant's text does not parse at its final type
    InvalidNumericLiteral { text: String },
    /// An aggregator body held more than one atom
    ComplexAggregateBody,
    /// An aggregator body held no atom to aggregate over
    EmptyAggregateBody,
    /// A variable has no storage location (fact arguments must be ground)
    UngroundedVariable { name: String },
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::UntypedNumericConstant { text } => {
                write!(f, "numeric constant '{}' has no final type", text)
            }
            LowerError::InvalidNumericLiteral { text } => {
                write!(f, "numeric constant '{}' does not fit its type", text)
            }
            LowerError::ComplexAggregateBody => {
                write!(f, "unsupported complex aggregation body encountered")
            }
            LowerError::EmptyAggregateBody => {
                write!(f, "aggregation body contains no atom")
            }
            LowerError::UngroundedVariable { name } => {
                write!(f, "variable '{}' has no storage location", name)
            }
        }
    }
}

impl std::error::Error for LowerError {}

/// A tuple environment introduced by a body atom or a nested record
enum NestingLevel {
    Atom { atom: Atom, level: usize },
    Record {
        args: Vec<Argument>,
        level: usize,
        definition: Location,
    },
}

/// Generates RAM code for a single clause.
pub struct ClauseTranslator<'a> {
    sips: SipsStrategy,
    symbols: &'a mut SymbolTable,
    value_index: ValueIndex,
    op_nesting: Vec<NestingLevel>,
    generators: Vec<(Argument, usize)>,
    level: usize,
}

impl<'a> ClauseTranslator<'a> {
    pub fn new(sips: SipsStrategy, symbols: &'a mut SymbolTable) -> Self {
        ClauseTranslator {
            sips,
            symbols,
            value_index: ValueIndex::new(),
            op_nesting: Vec::new(),
            generators: Vec::new(),
            level: 0,
        }
    }

    /// Lower one clause, reordering it first (or applying its execution
    /// plan for the given version).
    pub fn translate(mut self, clause: &Clause, version: u32) -> Result<Statement, LowerError> {
        let clause = self.reordered_clause(clause, version);
        let head_relation = clause.head.name.to_string();

        // facts project their ground arguments directly
        if clause.is_fact() {
            let mut concrete = Vec::new();
            for arg in &clause.head.concrete {
                concrete.push(self.translate_value(arg)?);
            }
            let mut lattice = Vec::new();
            for arg in &clause.head.lattice {
                lattice.push(self.translate_value(arg)?);
            }
            return Ok(Statement::Query(Operation::Project {
                relation: head_relation,
                concrete_exprs: concrete,
                lattice_exprs: lattice,
            }));
        }

        self.create_value_index(&clause)?;

        let mut op = self.create_operation(&clause)?;

        // equivalence constraints imposed by repeated variable occurrences
        let mut equalities: Vec<(Location, Location)> = Vec::new();
        for (_, locs) in self.value_index.variable_references() {
            let first = locs[0];
            for &loc in locs {
                if loc != first && !self.value_index.is_generator_level(loc.tuple_id) {
                    equalities.push((first, loc));
                }
            }
        }
        for (first, loc) in equalities {
            op = Operation::Filter {
                condition: Condition::Constraint {
                    op: ConstraintOp::Eq,
                    lhs: expr_at(first),
                    rhs: expr_at(loc),
                },
                inner: Box::new(op),
            };
        }

        // conditions caused by negations and binary constraints
        for lit in &clause.body {
            if let Some(condition) = self.literal_condition(lit)? {
                op = Operation::Filter {
                    condition,
                    inner: Box::new(op),
                };
            }
        }

        // tie aggregator results back into the atom positions they occupy
        let mut generator_equalities: Vec<(Expression, Location)> = Vec::new();
        for nesting in self.op_nesting.iter().rev() {
            let NestingLevel::Atom { atom, level } = nesting else {
                continue;
            };
            for (pos, arg) in atom.concrete.iter().enumerate() {
                if matches!(arg.kind, ArgumentKind::Aggregator { .. }) {
                    let loc = self
                        .value_index
                        .generator_loc(&arg.kind)
                        .expect("aggregator was assigned a generator level");
                    generator_equalities.push((Expression::concrete_element(*level, pos), loc));
                }
            }
            for (pos, arg) in atom.lattice.iter().enumerate() {
                if matches!(arg.kind, ArgumentKind::Aggregator { .. }) {
                    let loc = self
                        .value_index
                        .generator_loc(&arg.kind)
                        .expect("aggregator was assigned a generator level");
                    generator_equalities.push((Expression::lattice_element(*level, pos), loc));
                }
            }
        }
        for (lhs, loc) in generator_equalities {
            op = Operation::Filter {
                condition: Condition::Constraint {
                    op: ConstraintOp::Eq,
                    lhs,
                    rhs: expr_at(loc),
                },
                inner: Box::new(op),
            };
        }

        // generator levels, innermost first
        let generators = std::mem::take(&mut self.generators);
        for (generator, level) in generators.iter().rev() {
            op = self.lower_generator(generator, *level, op)?;
        }

        // scan and unpack levels, bottom-up
        while let Some(nesting) = self.op_nesting.pop() {
            op = match nesting {
                NestingLevel::Atom { atom, level } => {
                    self.lower_atom_level(&clause, &atom, level, op)?
                }
                NestingLevel::Record {
                    args,
                    level,
                    definition,
                } => self.lower_record_level(&args, level, definition, op)?,
            };
        }

        // stopping criteria for nullary heads: if the null tuple is already
        // derived, don't re-compute
        if clause.head.concrete_arity() == 0 {
            op = Operation::Filter {
                condition: Condition::EmptinessCheck {
                    relation: head_relation,
                },
                inner: Box::new(op),
            };
        }

        Ok(Statement::Query(op))
    }

    /// Apply the clause's execution plan for this version, or fall back to
    /// the SIPS-directed reordering.
    fn reordered_clause(&self, clause: &Clause, version: u32) -> Clause {
        if let Some(plan) = &clause.plan {
            if let Some(order) = plan.order_for(version) {
                // surface orders are 1-based
                let zero_based: Vec<usize> = order.iter().map(|&i| i as usize - 1).collect();
                let mut reordered = reorder_atoms(clause, &zero_based);
                reordered.plan = None;
                return reordered;
            }
            return clause.clone();
        }

        match reorder_clause_with_sips(&self.sips, clause) {
            Some(reordered) => reordered,
            None => clause.clone(),
        }
    }

    fn next_level(&mut self) -> usize {
        let level = self.level;
        self.level += 1;
        level
    }

    /// Index every value in the rule: atom levels, record levels, and
    /// generator levels.
    fn create_value_index(&mut self, clause: &Clause) -> Result<(), LowerError> {
        for lit in &clause.body {
            let Literal::Atom(atom) = lit else { continue };
            let level = self.next_level();
            self.op_nesting.push(NestingLevel::Atom {
                atom: atom.clone(),
                level,
            });
            for (pos, arg) in atom.concrete.iter().enumerate() {
                self.index_value(arg, Location::concrete(level, pos));
            }
            for (pos, arg) in atom.lattice.iter().enumerate() {
                self.index_value(arg, Location::lattice(level, pos));
            }
        }

        // aggregators and multi-result functors become generators
        self.collect_generators_in_clause(clause)?;

        // a variable equated to a multi-result functor shares its location
        let mut functor_aliases: Vec<(String, ArgumentKind)> = Vec::new();
        visit_constraints(clause, &mut |bc| {
            if bc.op != ConstraintOp::Eq {
                return;
            }
            let ArgumentKind::Variable(name) = &bc.lhs.kind else {
                return;
            };
            if let ArgumentKind::IntrinsicFunctor { op, .. } = &bc.rhs.kind {
                if FunctorAnalysis::is_multi_result(*op) {
                    functor_aliases.push((name.as_ref().clone(), bc.rhs.kind.clone()));
                }
            }
        });
        for (name, kind) in functor_aliases {
            if let Some(loc) = self.value_index.generator_loc(&kind) {
                self.value_index.add_var_reference(&name, loc);
            }
        }

        Ok(())
    }

    fn index_value(&mut self, arg: &Argument, loc: Location) {
        match &arg.kind {
            ArgumentKind::Variable(name) => {
                self.value_index.add_var_reference(name.as_ref(), loc);
            }
            ArgumentKind::RecordInit(args) => {
                // a nested record introduces an unpack level
                let record_level = self.next_level();
                self.op_nesting.push(NestingLevel::Record {
                    args: args.clone(),
                    level: record_level,
                    definition: loc,
                });
                for (pos, sub) in args.iter().enumerate() {
                    self.index_value(sub, Location::concrete(record_level, pos));
                }
            }
            _ => {}
        }
    }

    fn collect_generators_in_clause(&mut self, clause: &Clause) -> Result<(), LowerError> {
        for arg in clause.head.arguments() {
            self.collect_generators(arg)?;
        }
        for lit in &clause.body {
            match lit {
                Literal::Atom(atom) => {
                    for arg in atom.arguments() {
                        self.collect_generators(arg)?;
                    }
                }
                Literal::Negation(neg) => {
                    for arg in neg.atom.arguments() {
                        self.collect_generators(arg)?;
                    }
                }
                Literal::Constraint(bc) => {
                    self.collect_generators(&bc.lhs)?;
                    self.collect_generators(&bc.rhs)?;
                }
            }
        }
        Ok(())
    }

    /// Post-order walk assigning generator levels; nested generators get
    /// their level before the generator containing them.
    fn collect_generators(&mut self, arg: &Argument) -> Result<(), LowerError> {
        match &arg.kind {
            ArgumentKind::RecordInit(args) => {
                for sub in args {
                    self.collect_generators(sub)?;
                }
            }
            ArgumentKind::UserFunctor { args, .. } => {
                for sub in args {
                    self.collect_generators(sub)?;
                }
            }
            ArgumentKind::IntrinsicFunctor { op, args } => {
                for sub in args {
                    self.collect_generators(sub)?;
                }
                if FunctorAnalysis::is_multi_result(*op) {
                    let level = self.next_level();
                    self.value_index
                        .set_generator_loc(arg.kind.clone(), Location::concrete(level, 0));
                    self.generators.push((arg.clone(), level));
                }
            }
            ArgumentKind::Aggregator { target, body, .. } => {
                if let Some(target) = target {
                    self.collect_generators(target)?;
                }
                for lit in body {
                    match lit {
                        Literal::Atom(atom) => {
                            for sub in atom.arguments() {
                                self.collect_generators(sub)?;
                            }
                        }
                        Literal::Negation(neg) => {
                            for sub in neg.atom.arguments() {
                                self.collect_generators(sub)?;
                            }
                        }
                        Literal::Constraint(bc) => {
                            self.collect_generators(&bc.lhs)?;
                            self.collect_generators(&bc.rhs)?;
                        }
                    }
                }

                // structurally equal aggregators share one generator
                if self.generators.iter().any(|(g, _)| g == arg) {
                    return Ok(());
                }

                let level = self.next_level();
                self.value_index
                    .set_generator_loc(arg.kind.clone(), Location::concrete(level, 0));
                self.generators.push((arg.clone(), level));

                // bind the aggregate atom's variables to the new level
                let atom = single_aggregate_atom(body)?;
                if let Some(atom) = atom {
                    for (pos, sub) in atom.concrete.iter().enumerate() {
                        if let ArgumentKind::Variable(name) = &sub.kind {
                            self.value_index
                                .add_var_reference(name.as_ref(), Location::concrete(level, pos));
                        }
                    }
                    for (pos, sub) in atom.lattice.iter().enumerate() {
                        if let ArgumentKind::Variable(name) = &sub.kind {
                            self.value_index
                                .add_var_reference(name.as_ref(), Location::lattice(level, pos));
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// The innermost operation: project the head into the target relation
    fn create_operation(&mut self, clause: &Clause) -> Result<Operation, LowerError> {
        let head_relation = clause.head.name.to_string();

        let mut concrete = Vec::new();
        for arg in &clause.head.concrete {
            concrete.push(self.translate_value(arg)?);
        }
        let mut lattice = Vec::new();
        for arg in &clause.head.lattice {
            lattice.push(self.translate_value(arg)?);
        }

        let project = Operation::Project {
            relation: head_relation.clone(),
            concrete_exprs: concrete,
            lattice_exprs: lattice,
        };

        // nullary heads insert at most once
        if clause.head.concrete_arity() == 0 {
            return Ok(Operation::Filter {
                condition: Condition::EmptinessCheck {
                    relation: head_relation,
                },
                inner: Box::new(project),
            });
        }
        Ok(project)
    }

    /// The condition a body literal contributes, if any
    fn literal_condition(&mut self, lit: &Literal) -> Result<Option<Condition>, LowerError> {
        match lit {
            Literal::Atom(_) => Ok(None),
            Literal::Negation(neg) => {
                let mut concrete_pattern = Vec::new();
                for arg in &neg.atom.concrete {
                    concrete_pattern.push(self.translate_value(arg)?);
                }
                let mut lattice_pattern = Vec::new();
                for arg in &neg.atom.lattice {
                    lattice_pattern.push(self.translate_value(arg)?);
                }
                Ok(Some(Condition::Negation(Box::new(
                    Condition::ExistenceCheck {
                        relation: neg.atom.name.to_string(),
                        concrete_pattern,
                        lattice_pattern,
                    },
                ))))
            }
            Literal::Constraint(bc) => {
                let lhs = self.translate_value(&bc.lhs)?;
                let rhs = self.translate_value(&bc.rhs)?;
                Ok(Some(Condition::Constraint {
                    op: bc.op,
                    lhs,
                    rhs,
                }))
            }
        }
    }

    /// Wrap the operation in an `Aggregate` or `NestedIntrinsic` level
    fn lower_generator(
        &mut self,
        generator: &Argument,
        level: usize,
        inner: Operation,
    ) -> Result<Operation, LowerError> {
        match &generator.kind {
            ArgumentKind::Aggregator { op, target, body } => {
                let mut condition = Condition::True;

                // constraints of the sub-clause
                for lit in body {
                    if let Some(lit_condition) = self.literal_condition(lit)? {
                        condition = condition.and(lit_condition);
                    }
                }

                let atom = single_aggregate_atom(body)?.ok_or(LowerError::EmptyAggregateBody)?;

                // equate the aggregate scan's columns with the positions
                // binding them elsewhere; self-referential bindings are
                // skipped
                for (pos, arg) in atom.concrete.iter().enumerate() {
                    let here = Location::concrete(level, pos);
                    if let Some(cond) = self.aggregate_column_condition(arg, here)? {
                        condition = condition.and(cond);
                    }
                }
                for (pos, arg) in atom.lattice.iter().enumerate() {
                    let here = Location::lattice(level, pos);
                    if let Some(cond) = self.aggregate_column_condition(arg, here)? {
                        condition = condition.and(cond);
                    }
                }

                let expr = match target {
                    Some(target) => self.translate_value(target)?,
                    None => Expression::Undef,
                };

                Ok(Operation::Aggregate {
                    function: aggregate_function(*op),
                    relation: atom.name.to_string(),
                    tuple_id: level,
                    expr,
                    condition,
                    inner: Box::new(inner),
                })
            }
            ArgumentKind::IntrinsicFunctor { op, args } => {
                let mut exprs = Vec::new();
                for arg in args {
                    exprs.push(self.translate_value(arg)?);
                }
                Ok(Operation::NestedIntrinsic {
                    op: *op,
                    args: exprs,
                    tuple_id: level,
                    inner: Box::new(inner),
                })
            }
            _ => unreachable!("only aggregators and functors become generators"),
        }
    }

    fn aggregate_column_condition(
        &mut self,
        arg: &Argument,
        here: Location,
    ) -> Result<Option<Condition>, LowerError> {
        let rhs = match &arg.kind {
            ArgumentKind::Variable(name) => {
                // bind to any other occurrence of the variable
                let Some(locs) = self.value_index.references(name.as_ref()) else {
                    return Ok(None);
                };
                match locs.iter().find(|&&loc| loc != here) {
                    Some(&other) => expr_at(other),
                    None => return Ok(None),
                }
            }
            ArgumentKind::UnnamedVariable => return Ok(None),
            _ => self.translate_value(arg)?,
        };
        if rhs.is_undef() {
            return Ok(None);
        }
        Ok(Some(Condition::Constraint {
            op: ConstraintOp::Eq,
            lhs: expr_at(here),
            rhs,
        }))
    }

    /// Wrap the operation in the scan for one body atom
    fn lower_atom_level(
        &mut self,
        clause: &Clause,
        atom: &Atom,
        level: usize,
        inner: Operation,
    ) -> Result<Operation, LowerError> {
        // constants in atom positions become equality filters
        let mut op = self.filter_by_constants(atom, level, inner)?;

        let all_args_unnamed = atom
            .arguments()
            .all(|arg| matches!(arg.kind, ArgumentKind::UnnamedVariable))
            && atom.concrete_arity() + atom.lattice_arity() > 0;

        // an atom only contributes if its relation is non-empty
        op = Operation::Filter {
            condition: Condition::Negation(Box::new(Condition::EmptinessCheck {
                relation: atom.name.to_string(),
            })),
            inner: Box::new(op),
        };

        if atom.concrete_arity() + atom.lattice_arity() > 0 && !all_args_unnamed {
            if clause.head.concrete_arity() == 0 {
                // a nullary head needs deriving only once
                op = Operation::Break {
                    condition: Condition::Negation(Box::new(Condition::EmptinessCheck {
                        relation: clause.head.name.to_string(),
                    })),
                    inner: Box::new(op),
                };
            }
            op = Operation::Scan {
                relation: atom.name.to_string(),
                tuple_id: level,
                inner: Box::new(op),
            };
        }

        Ok(op)
    }

    fn lower_record_level(
        &mut self,
        args: &[Argument],
        level: usize,
        definition: Location,
        inner: Operation,
    ) -> Result<Operation, LowerError> {
        let mut op = inner;
        for (pos, arg) in args.iter().enumerate() {
            if arg.is_constant() {
                op = Operation::Filter {
                    condition: Condition::Constraint {
                        op: ConstraintOp::Eq,
                        lhs: Expression::concrete_element(level, pos),
                        rhs: self.translate_value(arg)?,
                    },
                    inner: Box::new(op),
                };
            }
        }
        Ok(Operation::UnpackRecord {
            expr: expr_at(definition),
            tuple_id: level,
            arity: args.len(),
            inner: Box::new(op),
        })
    }

    fn filter_by_constants(
        &mut self,
        atom: &Atom,
        level: usize,
        inner: Operation,
    ) -> Result<Operation, LowerError> {
        let mut op = inner;
        for (pos, arg) in atom.concrete.iter().enumerate() {
            if arg.is_constant() {
                op = Operation::Filter {
                    condition: Condition::Constraint {
                        op: ConstraintOp::Eq,
                        lhs: Expression::concrete_element(level, pos),
                        rhs: self.translate_value(arg)?,
                    },
                    inner: Box::new(op),
                };
            }
        }
        for (pos, arg) in atom.lattice.iter().enumerate() {
            if arg.is_constant() {
                op = Operation::Filter {
                    condition: Condition::Constraint {
                        op: ConstraintOp::Eq,
                        lhs: Expression::lattice_element(level, pos),
                        rhs: self.translate_value(arg)?,
                    },
                    inner: Box::new(op),
                };
            }
        }
        Ok(op)
    }

    /// Translate an argument to a RAM expression under the value index
    fn translate_value(&mut self, arg: &Argument) -> Result<Expression, LowerError> {
        match &arg.kind {
            ArgumentKind::Variable(name) => self
                .value_index
                .definition_point(name.as_ref())
                .map(expr_at)
                .ok_or_else(|| LowerError::UngroundedVariable {
                    name: name.as_ref().clone(),
                }),
            ArgumentKind::UnnamedVariable => Ok(Expression::Undef),
            ArgumentKind::NumericConstant(num) => translate_numeric_constant(num),
            ArgumentKind::StringConstant(text) => {
                Ok(Expression::SignedConstant(self.symbols.lookup(text)))
            }
            ArgumentKind::NilConstant => Ok(Expression::SignedConstant(0)),
            ArgumentKind::RecordInit(args) => {
                let mut exprs = Vec::new();
                for sub in args {
                    exprs.push(self.translate_value(sub)?);
                }
                Ok(Expression::PackRecord(exprs))
            }
            ArgumentKind::IntrinsicFunctor { op, args } => {
                if FunctorAnalysis::is_multi_result(*op) {
                    let loc = self
                        .value_index
                        .generator_loc(&arg.kind)
                        .expect("multi-result functor was assigned a generator level");
                    return Ok(expr_at(loc));
                }
                let mut exprs = Vec::new();
                for sub in args {
                    exprs.push(self.translate_value(sub)?);
                }
                Ok(Expression::IntrinsicOperator {
                    op: *op,
                    args: exprs,
                })
            }
            ArgumentKind::UserFunctor { name, args } => {
                let mut exprs = Vec::new();
                for sub in args {
                    exprs.push(self.translate_value(sub)?);
                }
                Ok(Expression::UserOperator {
                    name: name.as_ref().clone(),
                    args: exprs,
                })
            }
            ArgumentKind::Aggregator { .. } => {
                let loc = self
                    .value_index
                    .generator_loc(&arg.kind)
                    .expect("aggregator was assigned a generator level");
                Ok(expr_at(loc))
            }
        }
    }
}

fn expr_at(loc: Location) -> Expression {
    Expression::TupleElement {
        tuple_id: loc.tuple_id,
        element: loc.element,
        lattice: loc.lattice,
    }
}

fn aggregate_function(op: AggregateOp) -> AggregateFunction {
    match op {
        AggregateOp::Min => AggregateFunction::Min,
        AggregateOp::Max => AggregateFunction::Max,
        AggregateOp::Count => AggregateFunction::Count,
        AggregateOp::Sum => AggregateFunction::Sum,
        AggregateOp::Mean => AggregateFunction::Mean,
    }
}

/// An aggregate body may hold at most one atom
fn single_aggregate_atom(body: &[Literal]) -> Result<Option<&Atom>, LowerError> {
    let mut found = None;
    for lit in body {
        if let Literal::Atom(atom) = lit {
            if found.is_some() {
                return Err(LowerError::ComplexAggregateBody);
            }
            found = Some(atom);
        }
    }
    Ok(found)
}

fn translate_numeric_constant(num: &NumericConstant) -> Result<Expression, LowerError> {
    let invalid = || LowerError::InvalidNumericLiteral {
        text: num.text.clone(),
    };
    match num.ty {
        None => Err(LowerError::UntypedNumericConstant {
            text: num.text.clone(),
        }),
        Some(NumericType::Int) => num
            .text
            .parse::<i64>()
            .map(Expression::SignedConstant)
            .map_err(|_| invalid()),
        Some(NumericType::Uint) => num
            .text
            .parse::<u64>()
            .map(Expression::UnsignedConstant)
            .map_err(|_| invalid()),
        Some(NumericType::Float) => num
            .text
            .parse::<f64>()
            .map(Expression::FloatConstant)
            .map_err(|_| invalid()),
    }
}
