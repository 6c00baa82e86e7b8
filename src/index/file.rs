//! On-disk store: one gzip bucket file per descriptor plus a JSON registry.
//!
//! Each commit appends one gzip member to every bucket it touches and then atomically
//! replaces `registry.json` (temp file + rename). The registry records the committed
//! structures, the distance cutoff the descriptors were binned under, and the committed
//! byte length of every bucket. Readers never look past that length, so bytes written by an
//! interrupted commit stay invisible and are truncated by the next commit.

use super::error::Error;
use super::store::{Batch, IndexStore, Posting, reconcile_cutoff};
use crate::model::identifier::StructureIdentifier;
use crate::motif::descriptor::ResiduePairDescriptor;
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

const REGISTRY_FILE: &str = "registry.json";
const BUCKET_DIR: &str = "buckets";
const BUCKET_EXTENSION: &str = "jsonl.gz";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Registry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance_cutoff: Option<f64>,
    structures: BTreeSet<StructureIdentifier>,
    buckets: BTreeMap<String, u64>,
}

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    registry: RwLock<Registry>,
    commit_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store under `root`, creating the directory layout when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let bucket_dir = root.join(BUCKET_DIR);
        fs::create_dir_all(&bucket_dir).map_err(|e| Error::io(&bucket_dir, e))?;

        let registry_path = root.join(REGISTRY_FILE);
        let registry = if registry_path.is_file() {
            let file = File::open(&registry_path).map_err(|e| Error::io(&registry_path, e))?;
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| Error::registry(&registry_path, e))?
        } else {
            Registry::default()
        };

        log::debug!(
            "Opened index at '{}': {} structures, {} buckets",
            root.display(),
            registry.structures.len(),
            registry.buckets.len()
        );

        Ok(Self {
            root,
            registry: RwLock::new(registry),
            commit_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    fn bucket_path(&self, key: &str) -> PathBuf {
        self.root
            .join(BUCKET_DIR)
            .join(format!("{key}.{BUCKET_EXTENSION}"))
    }

    fn write_registry(&self, registry: &Registry) -> Result<(), Error> {
        let path = self.registry_path();
        let staging = path.with_extension("json.tmp");

        let file = File::create(&staging).map_err(|e| Error::io(&staging, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, registry).map_err(|e| Error::registry(&staging, e))?;
        writer.flush().map_err(|e| Error::io(&staging, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| Error::io(&staging, e))?;

        fs::rename(&staging, &path).map_err(|e| Error::io(&path, e))
    }
}

/// Appends one gzip member after the committed prefix of a bucket and returns the new
/// committed length.
fn append_member(path: &Path, committed: u64, postings: &[Posting]) -> Result<u64, Error> {
    let io_err = |e| Error::io(path, e);

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(io_err)?;
    file.set_len(committed).map_err(io_err)?;
    file.seek(SeekFrom::Start(committed)).map_err(io_err)?;

    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    for (i, posting) in postings.iter().enumerate() {
        let line = serde_json::to_string(posting)
            .map_err(|e| Error::corrupt_bucket(path, i + 1, e.to_string()))?;
        encoder.write_all(line.as_bytes()).map_err(io_err)?;
        encoder.write_all(b"\n").map_err(io_err)?;
    }

    let writer = encoder.finish().map_err(io_err)?;
    let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
    file.sync_data().map_err(io_err)?;
    Ok(file.metadata().map_err(io_err)?.len())
}

impl IndexStore for FileStore {
    fn contains(&self, structure: &StructureIdentifier) -> Result<bool, Error> {
        let registry = self
            .registry
            .read()
            .map_err(|_| Error::poisoned("file registry"))?;
        Ok(registry.structures.contains(structure))
    }

    fn commit(&self, batch: Batch) -> Result<(), Error> {
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| Error::poisoned("file commit"))?;

        let mut next = self
            .registry
            .read()
            .map_err(|_| Error::poisoned("file registry"))?
            .clone();
        next.distance_cutoff = reconcile_cutoff(next.distance_cutoff, batch.distance_cutoff())?;

        for (descriptor, postings) in batch.postings() {
            let key = descriptor.to_string();
            let path = self.bucket_path(&key);
            let committed = next.buckets.get(&key).copied().unwrap_or(0);
            let length = append_member(&path, committed, postings)?;
            next.buckets.insert(key, length);
        }
        next.structures.extend(batch.structures().iter().cloned());

        self.write_registry(&next)?;
        *self
            .registry
            .write()
            .map_err(|_| Error::poisoned("file registry"))? = next;
        Ok(())
    }

    fn select(&self, descriptor: &ResiduePairDescriptor) -> Result<Vec<Posting>, Error> {
        let key = descriptor.to_string();
        let committed = self
            .registry
            .read()
            .map_err(|_| Error::poisoned("file registry"))?
            .buckets
            .get(&key)
            .copied();
        let Some(length) = committed else {
            return Ok(Vec::new());
        };

        let path = self.bucket_path(&key);
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        let reader = BufReader::new(MultiGzDecoder::new(file.take(length)));

        let mut postings = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::corrupt_bucket(&path, i + 1, e.to_string()))?;
            if line.is_empty() {
                continue;
            }
            let posting = serde_json::from_str(&line)
                .map_err(|e| Error::corrupt_bucket(&path, i + 1, e.to_string()))?;
            postings.push(posting);
        }
        Ok(postings)
    }

    fn structure_count(&self) -> Result<usize, Error> {
        let registry = self
            .registry
            .read()
            .map_err(|_| Error::poisoned("file registry"))?;
        Ok(registry.structures.len())
    }

    fn distance_cutoff(&self) -> Result<Option<f64>, Error> {
        let registry = self
            .registry
            .read()
            .map_err(|_| Error::poisoned("file registry"))?;
        Ok(registry.distance_cutoff)
    }
}
