use crate::model::identifier::LabelSelection;
use crate::model::types::ResidueType;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Width of one distance bin in Å.
pub const DISTANCE_BIN_WIDTH: f64 = 1.0;
/// Width of one angle bin in degrees.
pub const ANGLE_BIN_WIDTH: f64 = 10.0;
/// Bins covering [0°, 180°]; 180° itself falls into the last bin.
pub const ANGLE_BIN_COUNT: u8 = 18;

/// Distance bin of `distance`, clamped to the last bin of a `cutoff`-bounded range.
pub fn distance_bin(distance: f64, cutoff: f64) -> u8 {
    let max_bin = max_distance_bin(cutoff);
    let bin = (distance.max(0.0) / DISTANCE_BIN_WIDTH).floor();
    if bin >= max_bin as f64 {
        max_bin
    } else {
        bin as u8
    }
}

/// Index of the last distance bin for `cutoff`.
pub fn max_distance_bin(cutoff: f64) -> u8 {
    (cutoff / DISTANCE_BIN_WIDTH).floor().clamp(0.0, u8::MAX as f64) as u8
}

/// Angle bin of an angle given in degrees.
pub fn angle_bin(degrees: f64) -> u8 {
    let bin = (degrees.clamp(0.0, 180.0) / ANGLE_BIN_WIDTH).floor() as u8;
    bin.min(ANGLE_BIN_COUNT - 1)
}

/// Discretized geometry of a residue pair.
///
/// Residue 1 never orders after residue 2 under (residue type, residue index); `flipped`
/// records whether the caller's argument order was swapped to reach that form. Equality,
/// hashing, and ordering ignore `flipped`, so both call orders address the same index
/// bucket.
#[derive(Debug, Clone, Copy)]
pub struct ResiduePairDescriptor {
    pub residue_type1: ResidueType,
    pub residue_type2: ResidueType,
    pub backbone_distance: u8,
    pub side_chain_distance: u8,
    pub angle: u8,
    pub flipped: bool,
}

impl ResiduePairDescriptor {
    pub fn new(
        residue_type1: ResidueType,
        residue_type2: ResidueType,
        backbone_distance: u8,
        side_chain_distance: u8,
        angle: u8,
    ) -> Self {
        Self {
            residue_type1,
            residue_type2,
            backbone_distance,
            side_chain_distance,
            angle,
            flipped: false,
        }
    }

    fn key(&self) -> (ResidueType, ResidueType, u8, u8, u8) {
        (
            self.residue_type1,
            self.residue_type2,
            self.backbone_distance,
            self.side_chain_distance,
            self.angle,
        )
    }

    /// Same residue types and orientation, different bins.
    pub fn with_bins(&self, backbone_distance: u8, side_chain_distance: u8, angle: u8) -> Self {
        Self {
            backbone_distance,
            side_chain_distance,
            angle,
            ..*self
        }
    }

    /// The stored form, with the orientation flag cleared.
    pub fn canonical(&self) -> Self {
        Self {
            flipped: false,
            ..*self
        }
    }
}

impl PartialEq for ResiduePairDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ResiduePairDescriptor {}

impl Hash for ResiduePairDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for ResiduePairDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResiduePairDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for ResiduePairDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.residue_type1,
            self.residue_type2,
            self.backbone_distance,
            self.side_chain_distance,
            self.angle
        )
    }
}

/// One occurrence of a descriptor: the two residues it was computed from.
///
/// `first` corresponds to residue 1 of `descriptor` unless `descriptor.flipped` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResiduePairIdentifier {
    pub first: LabelSelection,
    pub second: LabelSelection,
    pub descriptor: ResiduePairDescriptor,
}

impl ResiduePairIdentifier {
    pub fn new(
        first: LabelSelection,
        second: LabelSelection,
        descriptor: ResiduePairDescriptor,
    ) -> Self {
        Self {
            first,
            second,
            descriptor,
        }
    }

    /// The same occurrence seen from the opposite argument order.
    pub fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
            descriptor: ResiduePairDescriptor {
                flipped: !self.descriptor.flipped,
                ..self.descriptor
            },
        }
    }
}

impl fmt::Display for ResiduePairIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.first, self.second, self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn distance_bins_are_one_angstrom_wide_and_clamped() {
        assert_eq!(distance_bin(0.0, 20.0), 0);
        assert_eq!(distance_bin(0.99, 20.0), 0);
        assert_eq!(distance_bin(1.0, 20.0), 1);
        assert_eq!(distance_bin(7.5, 20.0), 7);
        assert_eq!(distance_bin(20.0, 20.0), 20);
        assert_eq!(distance_bin(27.3, 20.0), 20);
        assert_eq!(max_distance_bin(20.0), 20);
        assert_eq!(max_distance_bin(12.5), 12);
    }

    #[test]
    fn angle_bins_cover_half_turn() {
        assert_eq!(angle_bin(0.0), 0);
        assert_eq!(angle_bin(9.99), 0);
        assert_eq!(angle_bin(10.0), 1);
        assert_eq!(angle_bin(95.0), 9);
        assert_eq!(angle_bin(179.9), 17);
        assert_eq!(angle_bin(180.0), 17);
    }

    #[test]
    fn equality_and_hash_ignore_orientation_flag() {
        let plain = ResiduePairDescriptor::new(ResidueType::ALA, ResidueType::SER, 5, 6, 3);
        let flipped = ResiduePairDescriptor {
            flipped: true,
            ..plain
        };

        assert_eq!(plain, flipped);
        assert_eq!(plain.cmp(&flipped), Ordering::Equal);
        let set: HashSet<_> = [plain, flipped].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordering_follows_types_then_bins() {
        let a = ResiduePairDescriptor::new(ResidueType::ALA, ResidueType::SER, 9, 9, 9);
        let b = ResiduePairDescriptor::new(ResidueType::ARG, ResidueType::ALA, 0, 0, 0);
        let c = a.with_bins(9, 9, 10);

        assert!(a < b);
        assert!(a < c);
    }

    #[test]
    fn display_is_stable_bucket_name() {
        let d = ResiduePairDescriptor::new(ResidueType::GLY, ResidueType::DA, 4, 12, 17);
        assert_eq!(d.to_string(), "GLY-DA-4-12-17");
    }

    #[test]
    fn swapped_identifier_exchanges_selections_and_orientation() {
        let descriptor = ResiduePairDescriptor::new(ResidueType::ALA, ResidueType::SER, 1, 2, 3);
        let id = ResiduePairIdentifier::new(
            LabelSelection::new("A", "1", 5),
            LabelSelection::new("B", "1", 9),
            descriptor,
        );

        let swapped = id.clone().swapped();

        assert_eq!(swapped.first, id.second);
        assert_eq!(swapped.second, id.first);
        assert!(swapped.descriptor.flipped);
        assert_eq!(swapped.descriptor, id.descriptor);
    }
}
