use super::error::Error;
use super::store::{Batch, IndexStore, Posting, reconcile_cutoff};
use super::tolerance::{self, Tolerance};
use crate::config::Settings;
use crate::io::{self, StructureArchive, StructureSource};
use crate::model::identifier::StructureIdentifier;
use crate::model::structure::Structure;
use crate::motif::codec::DescriptorCodec;
use crate::motif::descriptor::{ResiduePairDescriptor, ResiduePairIdentifier};
use crate::utils::parallel::{IntoParallelIterator, ParallelIterator, WorkerPool};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Outcome of an index update.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Structures committed by this update.
    pub indexed: usize,
    /// Structures already indexed or submitted more than once.
    pub skipped: usize,
    /// Structures that could not be read or archived; they do not affect the rest of the
    /// update.
    pub failed: Vec<(StructureIdentifier, io::Error)>,
    /// Descriptor buckets touched, summed over committed batches.
    pub descriptors: usize,
    pub occurrences: usize,
}

/// All occurrences of one looked-up descriptor bucket inside one structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub structure: StructureIdentifier,
    pub occurrences: Vec<ResiduePairIdentifier>,
}

/// Geometric inverted index from residue-pair descriptors to their occurrences.
#[derive(Debug)]
pub struct InvertedIndex<S: IndexStore> {
    store: S,
    codec: DescriptorCodec,
    pool: WorkerPool,
    archive: Option<StructureArchive>,
    commit_lock: Mutex<()>,
}

type Described = (StructureIdentifier, Vec<ResiduePairIdentifier>);
type ReadOutcome = (StructureIdentifier, Result<Vec<ResiduePairIdentifier>, io::Error>);

impl<S: IndexStore> InvertedIndex<S> {
    /// Wraps `store`, which must be empty or hold descriptors binned under the cutoff of
    /// `codec`; otherwise [`Error::CutoffMismatch`] is returned.
    pub fn new(store: S, codec: DescriptorCodec, pool: WorkerPool) -> Result<Self, Error> {
        reconcile_cutoff(store.distance_cutoff()?, Some(codec.distance_cutoff()))?;
        Ok(Self {
            store,
            codec,
            pool,
            archive: None,
            commit_lock: Mutex::new(()),
        })
    }

    pub fn from_settings(store: S, settings: &Settings) -> Result<Self, Error> {
        let pool = WorkerPool::new(settings.number_threads)?;
        Self::new(store, DescriptorCodec::from_settings(settings), pool)
    }

    /// Writes every structure this index commits to `archive` as well.
    pub fn with_archive(mut self, archive: StructureArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn archive(&self) -> Option<&StructureArchive> {
        self.archive.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &DescriptorCodec {
        &self.codec
    }

    pub fn structure_count(&self) -> Result<usize, Error> {
        self.store.structure_count()
    }

    /// Indexes `structures`, committing one batch per `chunk_size` structures.
    ///
    /// Structures that are already indexed, or that appear earlier in the same input, are
    /// skipped. Re-running an update with the same input changes nothing.
    pub fn update(
        &self,
        structures: Vec<Structure>,
        chunk_size: usize,
    ) -> Result<UpdateReport, Error> {
        let mut report = UpdateReport::default();
        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for structure in structures {
            if !seen.insert(structure.id.clone()) || self.store.contains(&structure.id)? {
                report.skipped += 1;
                continue;
            }
            pending.push(structure);
        }

        let chunk_size = chunk_size.max(1);
        let total = pending.len().div_ceil(chunk_size);
        let mut remaining = pending.into_iter().peekable();
        let mut chunk_number = 0;
        while remaining.peek().is_some() {
            chunk_number += 1;
            let chunk: Vec<Structure> = remaining.by_ref().take(chunk_size).collect();
            let results: Vec<ReadOutcome> = self.pool.install(|| {
                chunk
                    .into_par_iter()
                    .map(|structure| {
                        let pairs = self.describe(&structure);
                        (structure.id, pairs)
                    })
                    .collect()
            });
            let described = split_failures(results, &mut report);
            self.commit_chunk(described, &mut report)?;
            log::info!(
                "Committed chunk {}/{}: {} structures indexed so far",
                chunk_number,
                total,
                report.indexed
            );
        }
        Ok(report)
    }

    /// Reads `ids` through `source` on the worker pool and indexes them.
    ///
    /// A structure that fails to read is recorded in [`UpdateReport::failed`] and the rest of
    /// its chunk is still committed.
    pub fn update_from_source(
        &self,
        source: &dyn StructureSource,
        ids: &[StructureIdentifier],
        chunk_size: usize,
    ) -> Result<UpdateReport, Error> {
        let mut report = UpdateReport::default();
        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) || self.store.contains(id)? {
                report.skipped += 1;
                continue;
            }
            pending.push(id.clone());
        }

        let chunk_size = chunk_size.max(1);
        let total = pending.len().div_ceil(chunk_size);
        for (n, chunk) in pending.chunks(chunk_size).enumerate() {
            let results: Vec<ReadOutcome> = self.pool.install(|| {
                chunk
                    .to_vec()
                    .into_par_iter()
                    .map(|id| {
                        let pairs = source
                            .read_structure(&id, None)
                            .and_then(|structure| self.describe(&structure));
                        (id, pairs)
                    })
                    .collect()
            });

            let described = split_failures(results, &mut report);
            self.commit_chunk(described, &mut report)?;
            log::info!(
                "Committed chunk {}/{}: {} indexed, {} failed",
                n + 1,
                total,
                report.indexed,
                report.failed.len()
            );
        }
        Ok(report)
    }

    /// Archives `structure` when an archive is attached, then lists its residue pairs.
    fn describe(&self, structure: &Structure) -> Result<Vec<ResiduePairIdentifier>, io::Error> {
        if let Some(archive) = &self.archive {
            archive.write(structure)?;
        }
        Ok(self.codec.pairs(structure))
    }

    fn commit_chunk(
        &self,
        described: Vec<Described>,
        report: &mut UpdateReport,
    ) -> Result<(), Error> {
        let mut batch = Batch::with_distance_cutoff(self.codec.distance_cutoff());
        for (id, pairs) in described {
            batch.insert(id, pairs);
        }

        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| Error::poisoned("index commit"))?;

        let mut already = HashSet::new();
        for id in batch.structures() {
            if self.store.contains(id)? {
                already.insert(id.clone());
            }
        }
        if !already.is_empty() {
            report.skipped += already.len();
            batch.retain_structures(|id| !already.contains(id));
        }
        if batch.is_empty() {
            return Ok(());
        }

        report.indexed += batch.structures().len();
        report.descriptors += batch.descriptor_count();
        report.occurrences += batch.occurrence_count();
        self.store.commit(batch)
    }

    /// Occurrences of every descriptor within `tolerance` of `descriptor`.
    ///
    /// Buckets are fetched one at a time as the iterator advances, so stopping early never
    /// reads the remaining buckets. Occurrences are reported in the orientation of the query:
    /// when `descriptor.flipped` is set, each occurrence has its selections swapped.
    pub fn lookup(
        &self,
        descriptor: &ResiduePairDescriptor,
        tolerance: Tolerance,
    ) -> Lookup<'_, S> {
        Lookup {
            store: &self.store,
            pending: tolerance::expand(descriptor, tolerance, self.codec.max_distance_bin())
                .into_iter(),
            current: Vec::new().into_iter(),
        }
    }
}

fn split_failures(results: Vec<ReadOutcome>, report: &mut UpdateReport) -> Vec<Described> {
    let mut described = Vec::with_capacity(results.len());
    for (id, result) in results {
        match result {
            Ok(pairs) => described.push((id, pairs)),
            Err(e) => {
                log::warn!("Skipping structure {id}: {e}");
                report.failed.push((id, e));
            }
        }
    }
    described
}

/// Lazy iterator returned by [`InvertedIndex::lookup`].
pub struct Lookup<'a, S: IndexStore> {
    store: &'a S,
    pending: std::vec::IntoIter<ResiduePairDescriptor>,
    current: std::vec::IntoIter<Hit>,
}

impl<S: IndexStore> Iterator for Lookup<'_, S> {
    type Item = Result<Hit, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.current.next() {
                return Some(Ok(hit));
            }
            let descriptor = self.pending.next()?;
            match self.store.select(&descriptor.canonical()) {
                Ok(postings) => self.current = group_hits(postings, &descriptor).into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn group_hits(postings: Vec<Posting>, descriptor: &ResiduePairDescriptor) -> Vec<Hit> {
    let canonical = descriptor.canonical();
    let mut hits: Vec<Hit> = Vec::new();
    let mut positions: HashMap<StructureIdentifier, usize> = HashMap::new();

    for posting in postings {
        let structure = posting.structure.clone();
        let occurrence = posting.into_identifier(canonical);
        let occurrence = if descriptor.flipped {
            occurrence.swapped()
        } else {
            occurrence
        };
        match positions.get(&structure) {
            Some(&i) => hits[i].occurrences.push(occurrence),
            None => {
                positions.insert(structure.clone(), hits.len());
                hits.push(Hit {
                    structure,
                    occurrences: vec![occurrence],
                });
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::file::FileStore;
    use crate::index::memory::MemoryStore;
    use crate::io::IoContext;
    use crate::model::atom::Atom;
    use crate::model::chain::Chain;
    use crate::model::identifier::{
        AtomIdentifier, ChainIdentifier, LabelSelection, ResidueIdentifier,
    };
    use crate::model::residue::Residue;
    use crate::model::transform::Transformation;
    use crate::model::types::{Point, ResidueType};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn residue(ty: ResidueType, index: usize, ca: [f64; 3], cb: [f64; 3]) -> Residue {
        Residue::new(
            ResidueIdentifier::new(ty, index as i32 + 1, index),
            vec![
                Atom::new(AtomIdentifier::new("CA", 2 * index), Point::from(ca)),
                Atom::new(AtomIdentifier::new("CB", 2 * index + 1), Point::from(cb)),
            ],
            Transformation::identity(),
        )
    }

    fn structure(id: &str, residues: Vec<Residue>) -> Structure {
        Structure::new(
            StructureIdentifier::new(id),
            vec![Chain::new(ChainIdentifier::new("A", "1"), residues)],
        )
    }

    fn triad(id: &str) -> Structure {
        structure(
            id,
            vec![
                residue(ResidueType::SER, 0, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
                residue(ResidueType::HIS, 1, [5.5, 0.0, 0.0], [6.5, 1.0, 0.0]),
                residue(ResidueType::ASP, 2, [25.0, 0.0, 0.0], [25.0, 1.0, 0.0]),
            ],
        )
    }

    fn index() -> InvertedIndex<MemoryStore> {
        InvertedIndex::new(
            MemoryStore::new(),
            DescriptorCodec::new(20.0),
            WorkerPool::new(2).unwrap(),
        )
        .unwrap()
    }

    fn query(index: &InvertedIndex<MemoryStore>) -> ResiduePairDescriptor {
        let s = triad("9qry");
        let residues = s.chains()[0].residues();
        index.codec().descriptor(&residues[0], &residues[1]).unwrap()
    }

    fn collect(lookup: Lookup<'_, MemoryStore>) -> Vec<Hit> {
        lookup.collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[test]
    fn update_indexes_pairs_within_cutoff() {
        let index = index();
        let report = index.update(vec![triad("1abc")], 10).unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped, 0);
        // ASP is 25 Å from SER, so only SER-HIS and HIS-ASP are described
        assert_eq!(report.occurrences, 2);
        assert_eq!(index.structure_count().unwrap(), 1);
    }

    #[test]
    fn update_is_idempotent() {
        let index = index();
        index.update(vec![triad("1abc"), triad("2abc")], 1).unwrap();
        let before = collect(index.lookup(&query(&index), Tolerance::EXACT));

        let report = index.update(vec![triad("1abc"), triad("2abc")], 1).unwrap();
        let after = collect(index.lookup(&query(&index), Tolerance::EXACT));

        assert_eq!(report.indexed, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(before, after);
        assert_eq!(index.store().descriptor_count().unwrap(), 2);
    }

    #[test]
    fn duplicates_within_one_update_are_skipped() {
        let index = index();
        let report = index
            .update(vec![triad("1abc"), triad("1abc"), triad("2abc")], 2)
            .unwrap();

        assert_eq!(report.indexed, 2);
        assert_eq!(report.skipped, 1);
        let hits = collect(index.lookup(&query(&index), Tolerance::EXACT));
        assert!(hits.iter().all(|hit| hit.occurrences.len() == 1));
    }

    #[test]
    fn exact_lookup_reports_canonical_occurrences() {
        let index = index();
        index.update(vec![triad("1abc")], 10).unwrap();

        let descriptor = query(&index);
        assert!(descriptor.flipped);
        let canonical = collect(index.lookup(&descriptor.canonical(), Tolerance::EXACT));

        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical[0].structure.as_str(), "1abc");
        let occurrence = &canonical[0].occurrences[0];
        assert_eq!(occurrence.first, LabelSelection::new("A", "1", 2));
        assert_eq!(occurrence.second, LabelSelection::new("A", "1", 1));
    }

    #[test]
    fn flipped_query_gets_occurrences_in_its_orientation() {
        let index = index();
        index.update(vec![triad("1abc")], 10).unwrap();

        let hits = collect(index.lookup(&query(&index), Tolerance::EXACT));

        let occurrence = &hits[0].occurrences[0];
        assert_eq!(occurrence.first, LabelSelection::new("A", "1", 1));
        assert_eq!(occurrence.second, LabelSelection::new("A", "1", 2));
        assert!(occurrence.descriptor.flipped);
    }

    #[test]
    fn tolerance_lookup_is_a_superset_of_exact() {
        let index = index();
        let shifted = structure(
            "3abc",
            vec![
                residue(ResidueType::SER, 0, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
                residue(ResidueType::HIS, 1, [6.5, 0.0, 0.0], [7.5, 1.0, 0.0]),
            ],
        );
        index.update(vec![triad("1abc"), shifted], 10).unwrap();
        let descriptor = query(&index);

        let exact: Vec<_> = collect(index.lookup(&descriptor, Tolerance::EXACT))
            .into_iter()
            .map(|hit| hit.structure)
            .collect();
        let loose: Vec<_> = collect(index.lookup(&descriptor, Tolerance::new(1, 1, 1)))
            .into_iter()
            .map(|hit| hit.structure)
            .collect();

        assert_eq!(exact, vec![StructureIdentifier::new("1abc")]);
        assert!(exact.iter().all(|id| loose.contains(id)));
        assert!(loose.contains(&StructureIdentifier::new("3abc")));
    }

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        selects: AtomicUsize,
    }

    impl IndexStore for CountingStore {
        fn contains(&self, structure: &StructureIdentifier) -> Result<bool, Error> {
            self.inner.contains(structure)
        }

        fn commit(&self, batch: Batch) -> Result<(), Error> {
            self.inner.commit(batch)
        }

        fn select(&self, descriptor: &ResiduePairDescriptor) -> Result<Vec<Posting>, Error> {
            self.selects.fetch_add(1, Ordering::SeqCst);
            self.inner.select(descriptor)
        }

        fn structure_count(&self) -> Result<usize, Error> {
            self.inner.structure_count()
        }

        fn distance_cutoff(&self) -> Result<Option<f64>, Error> {
            self.inner.distance_cutoff()
        }
    }

    #[test]
    fn lookup_stops_reading_buckets_when_dropped() {
        let index = InvertedIndex::new(
            CountingStore::default(),
            DescriptorCodec::new(20.0),
            WorkerPool::new(1).unwrap(),
        )
        .unwrap();
        let exact = {
            let s = triad("9qry");
            let residues = s.chains()[0].residues();
            index.codec().descriptor(&residues[0], &residues[1]).unwrap()
        };
        // every bucket of the 3x3x3 neighbourhood holds one hit
        for (n, d) in tolerance::expand(&exact, Tolerance::new(1, 1, 1), 20)
            .into_iter()
            .enumerate()
        {
            let mut batch = Batch::new();
            batch.insert(
                StructureIdentifier::new(&format!("{n}hit")),
                vec![ResiduePairIdentifier::new(
                    LabelSelection::new("A", "1", 1),
                    LabelSelection::new("A", "1", 2),
                    d.canonical(),
                )],
            );
            index.store().commit(batch).unwrap();
        }

        let first_three: Vec<_> = index
            .lookup(&exact, Tolerance::new(1, 1, 1))
            .take(3)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(first_three.len(), 3);
        assert_eq!(index.store().selects.load(Ordering::SeqCst), 3);
    }

    struct TextSource {
        entries: HashMap<StructureIdentifier, String>,
    }

    impl StructureSource for TextSource {
        fn read_structure(
            &self,
            id: &StructureIdentifier,
            selection: Option<&[LabelSelection]>,
        ) -> Result<Structure, io::Error> {
            let text = self
                .entries
                .get(id)
                .ok_or_else(|| io::Error::not_found(id.clone(), "memory"))?;
            io::read_structure(
                Cursor::new(text.as_bytes()),
                id.clone(),
                &IoContext::new_default(),
                selection,
            )
        }
    }

    fn entry(model: u32) -> String {
        format!(
            "data_TEST
loop_
_atom_site.group_PDB
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.pdbx_PDB_model_num
ATOM C CA SER A 1 0.0 0.0 0.0 {model}
ATOM C CB SER A 1 0.0 1.0 0.0 {model}
ATOM C CA HIS A 2 5.5 0.0 0.0 {model}
ATOM C CB HIS A 2 6.5 1.0 0.0 {model}
"
        )
    }

    #[test]
    fn unreadable_structures_are_isolated() {
        let source = TextSource {
            entries: HashMap::from([
                (StructureIdentifier::new("1abc"), entry(1)),
                (StructureIdentifier::new("2bad"), entry(2)),
                (StructureIdentifier::new("3abc"), entry(1)),
            ]),
        };
        let ids: Vec<_> = ["1abc", "2bad", "3abc", "4gone", "1abc"]
            .into_iter()
            .map(StructureIdentifier::new)
            .collect();
        let index = index();

        let report = index.update_from_source(&source, &ids, 2).unwrap();

        assert_eq!(report.indexed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().any(|(id, e)| id.as_str() == "2bad"
            && matches!(e, io::Error::UnsupportedModelNumbering { .. })));
        assert!(!index.store().contains(&StructureIdentifier::new("2bad")).unwrap());
        assert_eq!(collect(index.lookup(&query(&index), Tolerance::EXACT)).len(), 2);
    }

    fn distant_pair(id: &str) -> Structure {
        // CA atoms 9 Å apart, CB atoms 14 Å apart
        structure(
            id,
            vec![
                residue(ResidueType::SER, 0, [0.0, 0.0, 0.0], [-2.5, 0.0, 0.0]),
                residue(ResidueType::HIS, 1, [9.0, 0.0, 0.0], [11.5, 0.0, 0.0]),
            ],
        )
    }

    #[test]
    fn reopening_with_another_cutoff_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = InvertedIndex::new(
                FileStore::open(dir.path()).unwrap(),
                DescriptorCodec::new(10.0),
                WorkerPool::new(1).unwrap(),
            )
            .unwrap();
            let report = index.update(vec![distant_pair("1far")], 10).unwrap();
            assert_eq!(report.occurrences, 1);
        }

        let err = InvertedIndex::new(
            FileStore::open(dir.path()).unwrap(),
            DescriptorCodec::new(20.0),
            WorkerPool::new(1).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::CutoffMismatch { stored, requested } if stored == 10.0 && requested == 20.0
        ));

        let index = InvertedIndex::new(
            FileStore::open(dir.path()).unwrap(),
            DescriptorCodec::new(10.0),
            WorkerPool::new(1).unwrap(),
        )
        .unwrap();
        let s = distant_pair("9qry");
        let residues = s.chains()[0].residues();
        let descriptor = index.codec().descriptor(&residues[0], &residues[1]).unwrap();
        let hits = index
            .lookup(&descriptor, Tolerance::EXACT)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].structure.as_str(), "1far");
    }

    #[test]
    fn empty_store_accepts_any_cutoff() {
        let index = InvertedIndex::new(
            MemoryStore::new(),
            DescriptorCodec::new(12.0),
            WorkerPool::new(1).unwrap(),
        )
        .unwrap();
        index.update(vec![triad("1abc")], 10).unwrap();

        assert_eq!(index.store().distance_cutoff().unwrap(), Some(12.0));
    }

    #[test]
    fn update_archives_indexed_structures() {
        let dir = tempfile::tempdir().unwrap();
        let archive = StructureArchive::new(dir.path().join("structures"), 3);
        let index = index().with_archive(archive);

        let report = index.update(vec![triad("1abc")], 10).unwrap();
        assert_eq!(report.indexed, 1);

        let archive = index.archive().unwrap();
        let reread = archive
            .read_structure(&StructureIdentifier::new("1abc"), None)
            .unwrap();
        let original = triad("1abc");
        let residues = |s: &Structure| {
            s.iter_residues()
                .map(|r| (r.index(), r.seq_id(), r.residue_type()))
                .collect::<Vec<_>>()
        };
        assert_eq!(residues(&reread), residues(&original));
        assert_eq!(reread.chains()[0].id, ChainIdentifier::new("A", "1"));
        assert_eq!(index.codec().pairs(&reread), index.codec().pairs(&original));
    }

    #[test]
    fn failed_archive_writes_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("structures");
        std::fs::write(&blocked, "not a directory").unwrap();
        let index = index().with_archive(StructureArchive::new(&blocked, 3));

        let report = index.update(vec![triad("1abc")], 10).unwrap();

        assert_eq!(report.indexed, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, io::Error::Io { .. }));
        assert!(!index.store().contains(&StructureIdentifier::new("1abc")).unwrap());
    }
}
