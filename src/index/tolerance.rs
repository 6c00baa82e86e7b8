use crate::motif::descriptor::{ANGLE_BIN_COUNT, ResiduePairDescriptor};

/// Per-dimension bin shift accepted by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tolerance {
    pub backbone_distance: u8,
    pub side_chain_distance: u8,
    pub angle: u8,
}

impl Tolerance {
    pub const EXACT: Self = Self {
        backbone_distance: 0,
        side_chain_distance: 0,
        angle: 0,
    };

    pub const fn new(backbone_distance: u8, side_chain_distance: u8, angle: u8) -> Self {
        Self {
            backbone_distance,
            side_chain_distance,
            angle,
        }
    }
}

fn window(center: u8, shift: u8, max: u8) -> std::ops::RangeInclusive<u8> {
    let low = center.saturating_sub(shift);
    let high = center.saturating_add(shift).min(max);
    low..=high
}

/// Descriptors whose bins lie within `tolerance` of `descriptor`.
///
/// Shifted bins outside `[0, max_distance_bin]` (distances) or `[0, ANGLE_BIN_COUNT)` (angle)
/// are dropped rather than wrapped. Residue types and the orientation flag are kept. The
/// result is ordered by backbone bin, then side-chain bin, then angle bin.
pub fn expand(
    descriptor: &ResiduePairDescriptor,
    tolerance: Tolerance,
    max_distance_bin: u8,
) -> Vec<ResiduePairDescriptor> {
    let backbones = window(
        descriptor.backbone_distance,
        tolerance.backbone_distance,
        max_distance_bin,
    );
    let side_chains = window(
        descriptor.side_chain_distance,
        tolerance.side_chain_distance,
        max_distance_bin,
    );
    let angles = window(descriptor.angle, tolerance.angle, ANGLE_BIN_COUNT - 1);

    // Sized from the clipped windows; the unclipped cube can be orders of magnitude larger.
    let capacity = backbones.clone().count() * side_chains.clone().count() * angles.clone().count();
    let mut expanded = Vec::with_capacity(capacity);
    for backbone in backbones {
        for side_chain in side_chains.clone() {
            for angle in angles.clone() {
                expanded.push(descriptor.with_bins(backbone, side_chain, angle));
            }
        }
    }
    expanded
}
