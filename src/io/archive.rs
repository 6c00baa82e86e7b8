//! Archive of canonical structures kept next to the index.
//!
//! Every indexed structure is written once, already assembly-expanded and renumbered, as
//! `<root>/<id>.cif.gz`. Residue and atom indices stored in the index then stay resolvable
//! without repeating assembly expansion against the original deposition.

use crate::io::context::IoContext;
use crate::io::error::Error;
use crate::io::mmcif::writer;
use crate::io::source::{StructureSource, read_structure_file};
use crate::model::identifier::{LabelSelection, StructureIdentifier};
use crate::model::structure::Structure;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const ARCHIVE_EXTENSION: &str = "cif.gz";

#[derive(Debug, Clone)]
pub struct StructureArchive {
    root: PathBuf,
    precision: usize,
    context: IoContext,
}

impl StructureArchive {
    /// Archive under `root` writing coordinates with `precision` decimal places.
    pub fn new(root: impl Into<PathBuf>, precision: usize) -> Self {
        Self {
            root: root.into(),
            precision,
            context: IoContext::new_default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn path(&self, id: &StructureIdentifier) -> PathBuf {
        self.root.join(format!("{id}.{ARCHIVE_EXTENSION}"))
    }

    pub fn contains(&self, id: &StructureIdentifier) -> bool {
        self.path(id).is_file()
    }

    /// Writes `structure` and returns the archive path.
    ///
    /// The file is staged next to its destination and renamed into place, so an
    /// interrupted write never replaces a complete entry.
    pub fn write(&self, structure: &Structure) -> Result<PathBuf, Error> {
        fs::create_dir_all(&self.root).map_err(|e| Error::from_io(e, Some(self.root.clone())))?;

        let path = self.path(&structure.id);
        let staging = path.with_extension("gz.tmp");
        let io_err = |e| Error::from_io(e, Some(staging.clone()));

        let file = File::create(&staging).map_err(io_err)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        writer::write_structure(&mut encoder, structure, self.precision)
            .map_err(|e| e.with_path(&staging))?;
        let mut buffered = encoder.finish().map_err(io_err)?;
        buffered.flush().map_err(io_err)?;
        let file = buffered.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;

        fs::rename(&staging, &path).map_err(|e| Error::from_io(e, Some(path.clone())))?;
        log::debug!(
            "Archived structure {} to '{}': {} chains, {} atoms",
            structure.id,
            path.display(),
            structure.chain_count(),
            structure.atom_count()
        );
        Ok(path)
    }
}

impl StructureSource for StructureArchive {
    fn read_structure(
        &self,
        id: &StructureIdentifier,
        selection: Option<&[LabelSelection]>,
    ) -> Result<Structure, Error> {
        let path = self.path(id);
        if !path.is_file() {
            return Err(Error::not_found(id.clone(), &self.root));
        }
        read_structure_file(&path, id.clone(), &self.context, selection)
    }
}
