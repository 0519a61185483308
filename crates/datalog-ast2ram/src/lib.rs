//! Lowering from the Datalog AST to the RAM IR
//!
//! Each clause compiles to a RAM `Query`: body atoms become nested scans
//! guarded by non-emptiness checks, repeated variable occurrences become
//! equality filters, binary constraints become condition filters, records
//! unpack into fresh tuple environments, aggregators become `Aggregate`
//! levels with their own accumulated condition, and the head projects into
//! the target relation with its concrete and lattice expressions apart.
//!
//! Before translation every clause is reordered with the same SIPS metric
//! the [`datalog_transform`] reorderer uses, unless it carries an explicit
//! execution plan for the requested version.

mod symbols;
mod translator;
mod value_index;

pub use symbols::SymbolTable;
pub use translator::{ClauseTranslator, LowerError};
pub use value_index::{Location, ValueIndex};
