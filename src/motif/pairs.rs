//! Reduction of residues to representative points and enumeration of nearby pairs.

use crate::model::grid::Grid;
use crate::model::identifier::LabelSelection;
use crate::model::residue::Residue;
use crate::model::structure::Structure;
use crate::model::types::{Point, PolymerKind};

/// Backbone and side-chain points standing in for a whole residue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Representative {
    pub backbone: Point,
    pub side_chain: Point,
}

impl Representative {
    /// `CA`/`CB` for amino acids (a virtual Cβ when `CB` is absent, e.g. glycine) and
    /// `C4'`/`C1'` for nucleotides. `None` for unknown residues or missing atoms.
    pub fn of(residue: &Residue) -> Option<Self> {
        match residue.residue_type().kind() {
            PolymerKind::Protein => {
                let ca = residue.atom("CA")?.pos;
                let side_chain = match residue.atom("CB") {
                    Some(cb) => cb.pos,
                    None => virtual_beta_carbon(
                        &residue.atom("N")?.pos,
                        &ca,
                        &residue.atom("C")?.pos,
                    ),
                };
                Some(Self {
                    backbone: ca,
                    side_chain,
                })
            }
            PolymerKind::Nucleic => Some(Self {
                backbone: residue.atom("C4'")?.pos,
                side_chain: residue.atom("C1'")?.pos,
            }),
            PolymerKind::Other => None,
        }
    }
}

/// Ideal Cβ position from the backbone N, CA, and C atoms.
pub fn virtual_beta_carbon(n: &Point, ca: &Point, c: &Point) -> Point {
    let b = ca - n;
    let c = c - ca;
    let a = b.cross(&c);
    ca + a * -0.58273431 + b * 0.56802827 - c * 0.54067466
}

/// A residue that can take part in descriptors, with its label-based address.
#[derive(Debug, Clone)]
pub struct Anchor<'a> {
    pub selection: LabelSelection,
    pub residue: &'a Residue,
    pub representative: Representative,
}

/// Describable residues of `structure` in residue-index order.
pub fn anchors(structure: &Structure) -> Vec<Anchor<'_>> {
    structure
        .iter_residues_with_chain()
        .filter_map(|(chain, residue)| {
            Representative::of(residue).map(|representative| Anchor {
                selection: LabelSelection::new(
                    &chain.id.label_asym_id,
                    &chain.id.operator,
                    residue.seq_id(),
                ),
                residue,
                representative,
            })
        })
        .collect()
}

/// Every unordered pair `(i, j)`, `i < j`, whose backbone points lie within `cutoff`
/// (inclusive), sorted lexicographically.
pub fn neighbor_pairs(anchors: &[Anchor<'_>], cutoff: f64) -> Vec<(usize, usize)> {
    let grid = Grid::new(
        anchors
            .iter()
            .enumerate()
            .map(|(i, a)| (a.representative.backbone, i)),
        cutoff,
    );

    let mut pairs = Vec::new();
    for (i, anchor) in anchors.iter().enumerate() {
        let mut partners: Vec<usize> = grid
            .within(&anchor.representative.backbone, cutoff)
            .map(|(_, &j)| j)
            .filter(|&j| j > i)
            .collect();
        partners.sort_unstable();
        pairs.extend(partners.into_iter().map(|j| (i, j)));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::chain::Chain;
    use crate::model::identifier::{
        AtomIdentifier, ChainIdentifier, ResidueIdentifier, StructureIdentifier,
    };
    use crate::model::transform::Transformation;
    use crate::model::types::ResidueType;

    fn residue(ty: ResidueType, index: usize, atoms: &[(&str, [f64; 3])]) -> Residue {
        Residue::new(
            ResidueIdentifier::new(ty, index as i32 + 1, index),
            atoms
                .iter()
                .enumerate()
                .map(|(i, (name, p))| {
                    Atom::new(
                        AtomIdentifier::new(name, index * 10 + i),
                        Point::new(p[0], p[1], p[2]),
                    )
                })
                .collect(),
            Transformation::identity(),
        )
    }

    fn ca_only(index: usize, x: f64) -> Residue {
        residue(
            ResidueType::ALA,
            index,
            &[("CA", [x, 0.0, 0.0]), ("CB", [x, 1.0, 0.0])],
        )
    }

    #[test]
    fn representative_uses_cb_when_present() {
        let r = residue(
            ResidueType::SER,
            0,
            &[("N", [0.0, 1.0, 0.0]), ("CA", [0.0, 0.0, 0.0]), ("CB", [1.0, 1.0, 1.0])],
        );

        let rep = Representative::of(&r).unwrap();
        assert_eq!(rep.backbone, Point::origin());
        assert_eq!(rep.side_chain, Point::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn representative_builds_virtual_cb_for_glycine() {
        let r = residue(
            ResidueType::GLY,
            0,
            &[
                ("N", [-0.527, 1.359, 0.0]),
                ("CA", [0.0, 0.0, 0.0]),
                ("C", [1.525, 0.0, 0.0]),
            ],
        );

        let rep = Representative::of(&r).unwrap();
        let bond = (rep.side_chain - rep.backbone).norm();
        assert!((bond - 1.53).abs() < 0.05, "virtual CB bond length {bond}");
    }

    #[test]
    fn representative_uses_sugar_atoms_for_nucleotides() {
        let r = residue(
            ResidueType::G,
            0,
            &[("C4'", [1.0, 0.0, 0.0]), ("C1'", [2.0, 0.0, 0.0])],
        );

        let rep = Representative::of(&r).unwrap();
        assert_eq!(rep.backbone.x, 1.0);
        assert_eq!(rep.side_chain.x, 2.0);
    }

    #[test]
    fn representative_is_missing_for_unknown_or_incomplete_residues() {
        let unknown = residue(ResidueType::Unknown, 0, &[("CA", [0.0, 0.0, 0.0])]);
        let incomplete = residue(ResidueType::GLY, 1, &[("CA", [0.0, 0.0, 0.0])]);

        assert!(Representative::of(&unknown).is_none());
        assert!(Representative::of(&incomplete).is_none());
    }

    #[test]
    fn anchors_carry_label_selections() {
        let structure = Structure::new(
            StructureIdentifier::new("1tst"),
            vec![Chain::new(
                ChainIdentifier::new("B", "2"),
                vec![ca_only(0, 0.0), residue(ResidueType::Unknown, 1, &[])],
            )],
        );

        let anchors = anchors(&structure);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].selection.to_string(), "B_2_1");
    }

    #[test]
    fn neighbor_pairs_respect_cutoff() {
        let structure = Structure::new(
            StructureIdentifier::new("1tst"),
            vec![Chain::new(
                ChainIdentifier::new("A", "1"),
                vec![ca_only(0, 0.0), ca_only(1, 5.0), ca_only(2, 25.0), ca_only(3, 20.0)],
            )],
        );
        let anchors = anchors(&structure);

        let pairs = neighbor_pairs(&anchors, 20.0);

        // 0-2 is 25 Å apart; 0-3 sits exactly on the cutoff
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }
}
