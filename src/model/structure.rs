use super::atom::Atom;
use super::chain::Chain;
use super::identifier::{ChainIdentifier, LabelSelection, StructureIdentifier};
use super::residue::Residue;
use std::fmt;

/// The canonical, queryable unit: an identified, fully expanded set of chains.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub id: StructureIdentifier,
    chains: Vec<Chain>,
}

impl Structure {
    pub fn new(id: StructureIdentifier, chains: Vec<Chain>) -> Self {
        debug_assert!(
            chains
                .iter()
                .enumerate()
                .all(|(i, c)| chains[..i].iter().all(|o| o.id != c.id)),
            "Attempted to build structure '{}' with duplicate chain identifiers",
            id
        );
        Self { id, chains }
    }

    pub fn chain(&self, id: &ChainIdentifier) -> Option<&Chain> {
        self.chains.iter().find(|c| &c.id == id)
    }

    pub fn find_residue(&self, selection: &LabelSelection) -> Option<&Residue> {
        self.chain(&selection.chain())
            .and_then(|c| c.residue(selection.seq_id))
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn residue_count(&self) -> usize {
        self.chains.iter().map(|c| c.residue_count()).sum()
    }

    pub fn atom_count(&self) -> usize {
        self.chains.iter().map(|c| c.atom_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn iter_chains(&self) -> std::slice::Iter<'_, Chain> {
        self.chains.iter()
    }

    pub fn iter_residues(&self) -> impl Iterator<Item = &Residue> {
        self.chains.iter().flat_map(|c| c.iter_residues())
    }

    /// Residues paired with the chain that owns them, in emission order.
    pub fn iter_residues_with_chain(&self) -> impl Iterator<Item = (&Chain, &Residue)> {
        self.chains
            .iter()
            .flat_map(|chain| chain.iter_residues().map(move |residue| (chain, residue)))
    }

    pub fn iter_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.chains.iter().flat_map(|c| c.iter_atoms())
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Structure {{ id: {}, chains: {}, residues: {}, atoms: {} }}",
            self.id,
            self.chain_count(),
            self.residue_count(),
            self.atom_count()
        )
    }
}
