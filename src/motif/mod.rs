//! Residue-pair descriptors: the keys of the inverted index.
//!
//! A residue is reduced to a backbone point and a side-chain point; a pair of residues
//! within the distance cutoff is encoded as binned backbone distance, binned side-chain
//! distance, and binned angle between the two backbone→side-chain vectors, together with
//! the two residue types in canonical order.

pub mod codec;
pub mod descriptor;
pub mod pairs;
