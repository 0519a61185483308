//! Cross-crate scenario and property tests for the middle-end
//!
//! The per-crate unit tests cover each component in isolation; this crate
//! exercises the transformation pipeline end to end and checks the
//! universally quantified invariants with property-based testing.

#[cfg(test)]
mod common;

#[cfg(test)]
mod equivalence_props;

#[cfg(test)]
mod lowering_scenarios;

#[cfg(test)]
mod minimise_scenarios;

#[cfg(test)]
mod reorder_scenarios;
