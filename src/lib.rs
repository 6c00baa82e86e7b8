//! # MotifForge
//!
//! **MotifForge** is the pure-Rust core of a structural-motif search engine for macromolecular 3D structures. It turns deposited mmCIF coordinate files into canonical, symmetry-expanded structures and maintains a geometric inverted index over discretized residue-pair descriptors, so that every structure containing a residue pair of a given geometry can be found without scanning the archive.
//!
//! ## Features
//!
//! - **Canonical assemblies** – The mmCIF reader resolves alternate locations and microheterogeneity deterministically, rejects unsupported model numbering, and expands the first biological assembly through its symmetry operators.
//! - **Residue-pair descriptors** – `motif` reduces residues to backbone and side-chain points and bins distances and angles into an orientation-independent key with an explicit `flipped` flag.
//! - **Batched inverted index** – `index` computes descriptors on an explicit worker pool, commits them batch by batch to a memory or gzip-bucket file store, and skips structures that are already indexed.
//! - **Structure archive** – Every indexed structure is written back as renumbered, assembly-expanded mmCIF next to the index and can be re-read by identifier, optionally restricted to a residue selection.
//! - **Tolerant lookups** – Queries expand each bin dimension within a tolerance and stream hits lazily, so callers can stop after the first few results.
//! - **Strongly-typed identifiers** – Structures, chains, residues, and label selections carry their own types, keeping index postings and query results unambiguous.

mod model;
mod utils;

pub mod config;
pub mod index;
pub mod io;
pub mod motif;

pub use config::Settings;
pub use model::atom::Atom;
pub use model::chain::Chain;
pub use model::grid::Grid;
pub use model::identifier::{
    AtomIdentifier, ChainIdentifier, IDENTITY_OPERATOR, LabelSelection, ResidueIdentifier,
    StructureIdentifier,
};
pub use model::residue::Residue;
pub use model::structure::Structure;
pub use model::transform::Transformation;
pub use model::types::{Point, PolymerKind, ResidueType};
pub use utils::parallel::{PoolError, WorkerPool};
