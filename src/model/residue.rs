use super::atom::Atom;
use super::identifier::ResidueIdentifier;
use super::transform::Transformation;
use super::types::ResidueType;
use std::fmt;

/// A resolved polymer residue with uniquely named atoms.
///
/// `transformation` records the operator that produced the stored coordinates from the
/// asymmetric unit; atoms already carry the transformed positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub id: ResidueIdentifier,
    pub transformation: Transformation,
    atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(id: ResidueIdentifier, atoms: Vec<Atom>, transformation: Transformation) -> Self {
        debug_assert!(
            atoms
                .iter()
                .enumerate()
                .all(|(i, a)| atoms[..i].iter().all(|b| b.id.name != a.id.name)),
            "Attempted to build residue {} with duplicate atom names",
            id.seq_id
        );
        Self {
            id,
            transformation,
            atoms,
        }
    }

    pub fn residue_type(&self) -> ResidueType {
        self.id.residue_type
    }

    pub fn seq_id(&self) -> i32 {
        self.id.seq_id
    }

    pub fn index(&self) -> usize {
        self.id.index
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.id.name == name)
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom(name).is_some()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter_atoms(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Residue {{ index: {}, seq_id: {}, type: {}, atoms: {} }}",
            self.id.index,
            self.id.seq_id,
            self.id.residue_type,
            self.atom_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::identifier::AtomIdentifier;
    use crate::model::types::Point;

    fn sample_residue() -> Residue {
        Residue::new(
            ResidueIdentifier::new(ResidueType::SER, 42, 3),
            vec![
                Atom::new(AtomIdentifier::new("N", 10), Point::new(0.0, 0.0, 0.0)),
                Atom::new(AtomIdentifier::new("CA", 11), Point::new(1.5, 0.0, 0.0)),
                Atom::new(AtomIdentifier::new("OG", 12), Point::new(2.0, 1.0, 0.0)),
            ],
            Transformation::identity(),
        )
    }

    #[test]
    fn residue_exposes_identifier_fields() {
        let residue = sample_residue();

        assert_eq!(residue.residue_type(), ResidueType::SER);
        assert_eq!(residue.seq_id(), 42);
        assert_eq!(residue.index(), 3);
        assert!(residue.transformation.is_identity());
    }

    #[test]
    fn residue_atom_lookup_by_name() {
        let residue = sample_residue();

        assert_eq!(residue.atom_count(), 3);
        assert!(residue.has_atom("OG"));
        assert!(!residue.has_atom("CB"));
        assert_eq!(residue.atom("CA").unwrap().id.index, 11);
    }

    #[test]
    fn residue_preserves_atom_order() {
        let residue = sample_residue();
        let names: Vec<_> = residue.iter_atoms().map(|a| a.name()).collect();
        assert_eq!(names, vec!["N", "CA", "OG"]);
    }

    #[test]
    fn residue_display_formats_correctly() {
        let residue = sample_residue();
        assert_eq!(
            residue.to_string(),
            "Residue { index: 3, seq_id: 42, type: SER, atoms: 3 }"
        );
    }

    #[test]
    fn empty_residue_reports_empty() {
        let residue = Residue::new(
            ResidueIdentifier::new(ResidueType::Unknown, 1, 0),
            Vec::new(),
            Transformation::identity(),
        );
        assert!(residue.is_empty());
    }
}
