//! Analyses over the Datalog AST
//!
//! This crate implements the derived views the transformers consume:
//!
//! - **Clause normalisation**: a canonical form for each clause that
//!   abstracts away variable names and body-literal order
//! - **Bijective equivalence**: the decision procedure over normalised
//!   clauses used for rule deduplication and singleton-relation folding
//! - **BindingStore**: which variables are bound at a given evaluation
//!   point, used by the literal reorderer
//! - **I/O-type, profile-use, and functor analyses**: the narrow query
//!   interfaces the transformers need from their collaborators

mod binding;
mod equivalence;
mod functor;
mod io_type;
mod normalisation;
mod profile;

pub use binding::{BindingStore, BindingStrength};
pub use equivalence::are_bijectively_equivalent;
pub use functor::FunctorAnalysis;
pub use io_type::IoTypeAnalysis;
pub use normalisation::{ClauseNormalisationAnalysis, NormalisedClause, NormalisedElement};
pub use profile::ProfileUseAnalysis;
