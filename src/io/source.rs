use crate::io::assembly;
use crate::io::context::IoContext;
use crate::io::error::Error;
use crate::io::mmcif::reader;
use crate::model::identifier::{LabelSelection, StructureIdentifier};
use crate::model::structure::Structure;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Provider of canonical structures by identifier.
///
/// The index update pipeline only talks to this trait, so tests and alternative storage
/// layouts can substitute their own provider.
pub trait StructureSource: Send + Sync {
    fn read_structure(
        &self,
        id: &StructureIdentifier,
        selection: Option<&[LabelSelection]>,
    ) -> Result<Structure, Error>;
}

/// Reads and resolves an mmCIF stream into a canonical structure.
pub fn read_structure<R: BufRead>(
    reader: R,
    id: StructureIdentifier,
    context: &IoContext,
    selection: Option<&[LabelSelection]>,
) -> Result<Structure, Error> {
    let raw = reader::read(reader)?;
    assembly::build(id, raw, context, selection)
}

/// Reads a plain or gzip-compressed mmCIF file, sniffing compression from magic bytes.
pub fn read_structure_file(
    path: &Path,
    id: StructureIdentifier,
    context: &IoContext,
    selection: Option<&[LabelSelection]>,
) -> Result<Structure, Error> {
    let file = File::open(path).map_err(|e| Error::from_io(e, Some(path.to_path_buf())))?;
    let mut buffered = BufReader::new(file);
    let gzipped = buffered
        .fill_buf()
        .map_err(|e| Error::from_io(e, Some(path.to_path_buf())))?
        .starts_with(&GZIP_MAGIC);

    let result = if gzipped {
        let decoder = BufReader::new(MultiGzDecoder::new(buffered));
        read_structure(decoder, id, context, selection)
    } else {
        read_structure(buffered, id, context, selection)
    };
    result.map_err(|e| e.with_path(path))
}

/// Derives an entry identifier from a file name such as `1ABC.cif.gz`.
pub fn identifier_from_path(path: &Path) -> StructureIdentifier {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    StructureIdentifier::new(name.split('.').next().unwrap_or_default())
}

/// Local mirror laid out as `<root>/<id>.cif` or `<root>/<id>.cif.gz`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    context: IoContext,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_context(root, IoContext::new_default())
    }

    pub fn with_context(root: impl Into<PathBuf>, context: IoContext) -> Self {
        Self {
            root: root.into(),
            context,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing candidate file for `id`; lowercase names are preferred.
    pub fn locate(&self, id: &StructureIdentifier) -> Option<PathBuf> {
        let lower = id.as_str().to_string();
        let upper = id.as_str().to_ascii_uppercase();
        [lower, upper]
            .iter()
            .flat_map(|stem| [format!("{stem}.cif"), format!("{stem}.cif.gz")])
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
    }
}

impl StructureSource for DirectorySource {
    fn read_structure(
        &self,
        id: &StructureIdentifier,
        selection: Option<&[LabelSelection]>,
    ) -> Result<Structure, Error> {
        let path = self
            .locate(id)
            .ok_or_else(|| Error::not_found(id.clone(), &self.root))?;
        let structure = read_structure_file(&path, id.clone(), &self.context, selection)?;
        log::debug!(
            "Read structure {} from '{}': {} chains, {} residues",
            id,
            path.display(),
            structure.chain_count(),
            structure.residue_count()
        );
        Ok(structure)
    }
}
