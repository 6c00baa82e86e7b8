//! Core data structures modeling canonical macromolecular assemblies.
//!
//! The types here are immutable value aggregates: readers resolve heterogeneity and
//! expand assembly operators first, then build [`structure::Structure`] values that are
//! only ever read by the descriptor codec and the inverted index.

pub mod atom;
pub mod chain;
pub mod grid;
pub mod identifier;
pub mod residue;
pub mod structure;
pub mod transform;
pub mod types;
