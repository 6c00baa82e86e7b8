use super::error::Error;
use super::store::{Batch, IndexStore, Posting, reconcile_cutoff};
use crate::model::identifier::StructureIdentifier;
use crate::motif::descriptor::ResiduePairDescriptor;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    structures: HashSet<StructureIdentifier>,
    buckets: HashMap<ResiduePairDescriptor, Vec<Posting>>,
    distance_cutoff: Option<f64>,
}

/// Process-local store; a commit is applied under one write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor_count(&self) -> Result<usize, Error> {
        let state = self.state.read().map_err(|_| Error::poisoned("memory store"))?;
        Ok(state.buckets.len())
    }
}

impl IndexStore for MemoryStore {
    fn contains(&self, structure: &StructureIdentifier) -> Result<bool, Error> {
        let state = self.state.read().map_err(|_| Error::poisoned("memory store"))?;
        Ok(state.structures.contains(structure))
    }

    fn commit(&self, batch: Batch) -> Result<(), Error> {
        let mut state = self
            .state
            .write()
            .map_err(|_| Error::poisoned("memory store"))?;
        state.distance_cutoff = reconcile_cutoff(state.distance_cutoff, batch.distance_cutoff())?;
        for (descriptor, postings) in batch.postings() {
            state
                .buckets
                .entry(*descriptor)
                .or_default()
                .extend(postings.iter().cloned());
        }
        state.structures.extend(batch.structures().iter().cloned());
        Ok(())
    }

    fn select(&self, descriptor: &ResiduePairDescriptor) -> Result<Vec<Posting>, Error> {
        let state = self.state.read().map_err(|_| Error::poisoned("memory store"))?;
        Ok(state.buckets.get(descriptor).cloned().unwrap_or_default())
    }

    fn structure_count(&self) -> Result<usize, Error> {
        let state = self.state.read().map_err(|_| Error::poisoned("memory store"))?;
        Ok(state.structures.len())
    }

    fn distance_cutoff(&self) -> Result<Option<f64>, Error> {
        let state = self.state.read().map_err(|_| Error::poisoned("memory store"))?;
        Ok(state.distance_cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::ResidueType;
    use crate::motif::descriptor::ResiduePairIdentifier;

    fn descriptor(angle: u8) -> ResiduePairDescriptor {
        ResiduePairDescriptor::new(ResidueType::ASP, ResidueType::HIS, 6, 7, angle)
    }

    fn batch(id: &str, angles: &[u8]) -> Batch {
        let mut batch = Batch::new();
        batch.insert(
            StructureIdentifier::new(id),
            angles.iter().map(|&a| {
                ResiduePairIdentifier::new(
                    "A_1_10".parse().unwrap(),
                    "A_1_57".parse().unwrap(),
                    descriptor(a),
                )
            }),
        );
        batch
    }

    #[test]
    fn committed_batches_are_visible() {
        let store = MemoryStore::new();
        store.commit(batch("1abc", &[3, 4])).unwrap();
        store.commit(batch("2abc", &[3])).unwrap();

        assert!(store.contains(&StructureIdentifier::new("1abc")).unwrap());
        assert_eq!(store.structure_count().unwrap(), 2);
        assert_eq!(store.descriptor_count().unwrap(), 2);
        assert_eq!(store.select(&descriptor(3)).unwrap().len(), 2);
        assert_eq!(store.select(&descriptor(4)).unwrap().len(), 1);
    }

    #[test]
    fn mismatching_cutoff_leaves_the_store_untouched() {
        let store = MemoryStore::new();
        let mut first = Batch::with_distance_cutoff(10.0);
        first.insert(StructureIdentifier::new("1abc"), Vec::new());
        store.commit(first).unwrap();

        let mut second = Batch::with_distance_cutoff(20.0);
        second.insert(StructureIdentifier::new("2abc"), Vec::new());
        let err = store.commit(second).unwrap_err();

        assert!(matches!(err, Error::CutoffMismatch { .. }));
        assert_eq!(store.distance_cutoff().unwrap(), Some(10.0));
        assert_eq!(store.structure_count().unwrap(), 1);
    }

    #[test]
    fn missing_bucket_is_empty() {
        let store = MemoryStore::new();
        assert!(store.select(&descriptor(9)).unwrap().is_empty());
        assert!(!store.contains(&StructureIdentifier::new("1abc")).unwrap());
    }
}
