//! Smallest structural unit: a named atom at a Cartesian position.
//!
//! Atoms are created once by the assembly builder, already carrying their final
//! (operator-transformed) coordinates, and are never mutated afterwards.

use super::identifier::AtomIdentifier;
use super::transform::Transformation;
use super::types::Point;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name plus the structure-wide atom index.
    pub id: AtomIdentifier,
    /// Cartesian coordinates measured in ångströms.
    pub pos: Point,
}

impl Atom {
    pub fn new(id: AtomIdentifier, pos: Point) -> Self {
        Self { id, pos }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// Squared Euclidean distance to another atom, in Å².
    pub fn distance_squared(&self, other: &Atom) -> f64 {
        nalgebra::distance_squared(&self.pos, &other.pos)
    }

    pub fn distance(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.pos, &other.pos)
    }

    /// Returns a copy of this atom moved by `transformation`, keeping its identifier.
    pub fn transformed(&self, transformation: &Transformation) -> Atom {
        Atom {
            id: self.id.clone(),
            pos: transformation.apply(&self.pos),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Atom {{ name: \"{}\", index: {}, pos: [{:.3}, {:.3}, {:.3}] }}",
            self.id.name, self.id.index, self.pos.x, self.pos.y, self.pos.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Vector3};

    #[test]
    fn atom_new_creates_correct_atom() {
        let pos = Point::new(1.0, 2.0, 3.0);
        let atom = Atom::new(AtomIdentifier::new("CA", 4), pos);

        assert_eq!(atom.name(), "CA");
        assert_eq!(atom.id.index, 4);
        assert_eq!(atom.pos, pos);
    }

    #[test]
    fn atom_distance_calculates_correctly() {
        let a = Atom::new(AtomIdentifier::new("A", 0), Point::new(0.0, 0.0, 0.0));
        let b = Atom::new(AtomIdentifier::new("B", 1), Point::new(3.0, 4.0, 0.0));

        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-10);
        assert!((a.distance(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn atom_transformed_moves_position_and_keeps_identifier() {
        let atom = Atom::new(AtomIdentifier::new("N", 9), Point::new(1.0, 2.0, 3.0));
        let shift = Transformation::from_parts(Matrix3::identity(), Vector3::new(0.5, -1.0, 2.5));

        let moved = atom.transformed(&shift);

        assert_eq!(moved.id, atom.id);
        assert!((moved.pos.x - 1.5).abs() < 1e-10);
        assert!((moved.pos.y - 1.0).abs() < 1e-10);
        assert!((moved.pos.z - 5.5).abs() < 1e-10);
    }

    #[test]
    fn atom_display_formats_correctly() {
        let atom = Atom::new(
            AtomIdentifier::new("CA", 12),
            Point::new(1.234, -5.678, 9.012),
        );

        let expected = "Atom { name: \"CA\", index: 12, pos: [1.234, -5.678, 9.012] }";
        assert_eq!(atom.to_string(), expected);
    }
}
