use super::atom::Atom;
use super::identifier::ChainIdentifier;
use super::residue::Residue;
use std::fmt;

/// One (chain label, operator) replica with its ordered residues.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: ChainIdentifier,
    residues: Vec<Residue>,
}

impl Chain {
    pub fn new(id: ChainIdentifier, residues: Vec<Residue>) -> Self {
        Self { id, residues }
    }

    /// Finds a residue by its biological sequence position.
    pub fn residue(&self, seq_id: i32) -> Option<&Residue> {
        self.residues.iter().find(|r| r.seq_id() == seq_id)
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn atom_count(&self) -> usize {
        self.residues.iter().map(|r| r.atom_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn iter_residues(&self) -> std::slice::Iter<'_, Residue> {
        self.residues.iter()
    }

    pub fn iter_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.residues.iter().flat_map(|r| r.iter_atoms())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chain {{ id: \"{}\", residues: {} }}",
            self.id,
            self.residue_count()
        )
    }
}
