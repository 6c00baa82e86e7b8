//! Geometric inverted index over residue-pair descriptors.
//!
//! [`InvertedIndex`] computes descriptors for whole structures on a worker pool and commits
//! them in batches to an [`IndexStore`]; lookups expand a query descriptor within a
//! [`Tolerance`] and stream the matching occurrences bucket by bucket.

mod error;
mod file;
mod inverted;
mod memory;
mod store;
mod tolerance;

pub use error::Error;
pub use file::FileStore;
pub use inverted::{Hit, InvertedIndex, Lookup, UpdateReport};
pub use memory::MemoryStore;
pub use store::{Batch, IndexStore, Posting};
pub use tolerance::{Tolerance, expand as expand_tolerance};
