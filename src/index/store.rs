use super::error::Error;
use crate::model::identifier::{LabelSelection, StructureIdentifier};
use crate::motif::descriptor::{ResiduePairDescriptor, ResiduePairIdentifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stored occurrence inside a descriptor bucket, in canonical orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub structure: StructureIdentifier,
    pub first: LabelSelection,
    pub second: LabelSelection,
}

impl Posting {
    pub fn into_identifier(self, descriptor: ResiduePairDescriptor) -> ResiduePairIdentifier {
        ResiduePairIdentifier::new(self.first, self.second, descriptor)
    }
}

/// Descriptor occurrences of a group of structures, committed as one unit.
///
/// Structures without any describable pair are still listed so that they count as indexed.
/// A batch tagged with the distance cutoff it was described under makes the store record
/// that cutoff on first commit and reject any other one afterwards.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    structures: Vec<StructureIdentifier>,
    postings: BTreeMap<ResiduePairDescriptor, Vec<Posting>>,
    distance_cutoff: Option<f64>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_distance_cutoff(distance_cutoff: f64) -> Self {
        Self {
            distance_cutoff: Some(distance_cutoff),
            ..Self::default()
        }
    }

    pub fn distance_cutoff(&self) -> Option<f64> {
        self.distance_cutoff
    }

    pub fn insert(
        &mut self,
        structure: StructureIdentifier,
        occurrences: impl IntoIterator<Item = ResiduePairIdentifier>,
    ) {
        for occurrence in occurrences {
            let occurrence = if occurrence.descriptor.flipped {
                occurrence.swapped()
            } else {
                occurrence
            };
            self.postings
                .entry(occurrence.descriptor.canonical())
                .or_default()
                .push(Posting {
                    structure: structure.clone(),
                    first: occurrence.first,
                    second: occurrence.second,
                });
        }
        self.structures.push(structure);
    }

    /// Drops every structure rejected by `keep`, together with its postings.
    pub fn retain_structures(&mut self, mut keep: impl FnMut(&StructureIdentifier) -> bool) {
        self.structures.retain(|s| keep(s));
        let kept: std::collections::HashSet<&StructureIdentifier> =
            self.structures.iter().collect();
        for postings in self.postings.values_mut() {
            postings.retain(|p| kept.contains(&p.structure));
        }
        self.postings.retain(|_, postings| !postings.is_empty());
    }

    pub fn structures(&self) -> &[StructureIdentifier] {
        &self.structures
    }

    pub fn postings(&self) -> &BTreeMap<ResiduePairDescriptor, Vec<Posting>> {
        &self.postings
    }

    pub fn descriptor_count(&self) -> usize {
        self.postings.len()
    }

    pub fn occurrence_count(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

/// Cutoff a store should record after committing a batch described under `requested`.
///
/// Fails when the store already holds descriptors binned under a different cutoff.
pub(super) fn reconcile_cutoff(
    stored: Option<f64>,
    requested: Option<f64>,
) -> Result<Option<f64>, Error> {
    match (stored, requested) {
        (Some(stored), Some(requested)) if (stored - requested).abs() > CUTOFF_EPSILON => {
            Err(Error::cutoff_mismatch(stored, requested))
        }
        (Some(stored), _) => Ok(Some(stored)),
        (None, requested) => Ok(requested),
    }
}

const CUTOFF_EPSILON: f64 = 1e-9;

/// Storage backend of the inverted index.
///
/// A committed batch becomes visible to `contains`, `select`, and `structure_count` as a
/// whole; readers never observe part of a batch.
pub trait IndexStore: Send + Sync {
    fn contains(&self, structure: &StructureIdentifier) -> Result<bool, Error>;

    fn commit(&self, batch: Batch) -> Result<(), Error>;

    /// Postings of one descriptor bucket; an absent bucket yields an empty list.
    fn select(&self, descriptor: &ResiduePairDescriptor) -> Result<Vec<Posting>, Error>;

    fn structure_count(&self) -> Result<usize, Error>;

    /// Distance cutoff the stored descriptors were binned under, once anything was committed
    /// with one.
    fn distance_cutoff(&self) -> Result<Option<f64>, Error>;
}
