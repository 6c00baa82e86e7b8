use super::descriptor::{
    ResiduePairDescriptor, ResiduePairIdentifier, angle_bin, distance_bin, max_distance_bin,
};
use super::pairs::{self, Representative};
use crate::config::Settings;
use crate::model::residue::Residue;
use crate::model::structure::Structure;
use crate::model::types::ResidueType;
use nalgebra::Vector3;

/// Descriptor of one pair of query motif residues, addressed by motif position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotifPair {
    pub first: usize,
    pub second: usize,
    pub descriptor: ResiduePairDescriptor,
}

/// Maps residue pairs to discretized [`ResiduePairDescriptor`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorCodec {
    distance_cutoff: f64,
}

impl DescriptorCodec {
    /// # Panics
    ///
    /// Panics if `distance_cutoff` is not strictly positive.
    pub fn new(distance_cutoff: f64) -> Self {
        assert!(distance_cutoff > 0.0, "Distance cutoff must be positive");
        Self { distance_cutoff }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.distance_cutoff)
    }

    pub fn distance_cutoff(&self) -> f64 {
        self.distance_cutoff
    }

    pub fn max_distance_bin(&self) -> u8 {
        max_distance_bin(self.distance_cutoff)
    }

    /// Descriptor of `(first, second)` in the caller's order, or `None` when either residue
    /// cannot be reduced to representative points or the backbone distance exceeds the
    /// cutoff.
    pub fn descriptor(&self, first: &Residue, second: &Residue) -> Option<ResiduePairDescriptor> {
        let a = Representative::of(first)?;
        let b = Representative::of(second)?;
        self.encode(
            (first.residue_type(), first.index(), &a),
            (second.residue_type(), second.index(), &b),
        )
    }

    fn encode(
        &self,
        first: (ResidueType, usize, &Representative),
        second: (ResidueType, usize, &Representative),
    ) -> Option<ResiduePairDescriptor> {
        let backbone = nalgebra::distance(&first.2.backbone, &second.2.backbone);
        if backbone > self.distance_cutoff {
            return None;
        }
        let side_chain = nalgebra::distance(&first.2.side_chain, &second.2.side_chain);
        let angle = angle_between(
            &(first.2.side_chain - first.2.backbone),
            &(second.2.side_chain - second.2.backbone),
        );

        let flipped = (first.0, first.1) > (second.0, second.1);
        let (type1, type2) = if flipped {
            (second.0, first.0)
        } else {
            (first.0, second.0)
        };

        Some(ResiduePairDescriptor {
            residue_type1: type1,
            residue_type2: type2,
            backbone_distance: distance_bin(backbone, self.distance_cutoff),
            side_chain_distance: distance_bin(side_chain, self.distance_cutoff),
            angle: angle_bin(angle),
            flipped,
        })
    }

    /// Every describable residue pair of `structure` within the cutoff, in canonical
    /// orientation and ordered by residue index.
    pub fn pairs(&self, structure: &Structure) -> Vec<ResiduePairIdentifier> {
        let anchors = pairs::anchors(structure);
        pairs::neighbor_pairs(&anchors, self.distance_cutoff)
            .into_iter()
            .filter_map(|(i, j)| {
                let (a, b) = (&anchors[i], &anchors[j]);
                let descriptor = self.encode(
                    (a.residue.residue_type(), a.residue.index(), &a.representative),
                    (b.residue.residue_type(), b.residue.index(), &b.representative),
                )?;
                let occurrence = ResiduePairIdentifier::new(
                    a.selection.clone(),
                    b.selection.clone(),
                    descriptor,
                );
                Some(if descriptor.flipped {
                    occurrence.swapped()
                } else {
                    occurrence
                })
            })
            .collect()
    }

    /// Descriptors of all residue pairs of a query motif, in motif order.
    pub fn motif_descriptors(&self, residues: &[Residue]) -> Vec<MotifPair> {
        let mut result = Vec::new();
        for (i, first) in residues.iter().enumerate() {
            for (j, second) in residues.iter().enumerate().skip(i + 1) {
                if let Some(descriptor) = self.descriptor(first, second) {
                    result.push(MotifPair {
                        first: i,
                        second: j,
                        descriptor,
                    });
                }
            }
        }
        result
    }
}

impl Default for DescriptorCodec {
    fn default() -> Self {
        Self::new(Settings::default().distance_cutoff)
    }
}

/// Angle in degrees between two vectors; 0 when either is degenerate.
fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let norms = a.norm() * b.norm();
    if norms < f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / norms).clamp(-1.0, 1.0).acos().to_degrees()
}
