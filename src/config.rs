//! Runtime settings for reading, indexing, and querying.
//!
//! Every field has a default, so an empty TOML document (or no file at all) yields a
//! working configuration. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Error {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

const MAX_COORDINATE_PRECISION: usize = 6;
const ARCHIVE_DIR: &str = "structures";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Backbone distance (Å) beyond which residue pairs are not indexed. Also the upper
    /// bound of the distance bins.
    pub distance_cutoff: f64,
    /// Directory holding the on-disk index.
    pub root_path: PathBuf,
    /// Directory holding `<id>.cif` / `<id>.cif.gz` entries.
    pub data_source: PathBuf,
    pub number_threads: usize,
    /// Accepted-result budget for consumers of a lookup.
    pub max_results: usize,
    /// Structures per committed index batch.
    pub update_chunk_size: usize,
    pub max_motif_size: usize,
    /// Decimal places of the coordinates in archived structures under
    /// `<root_path>/structures`.
    pub renumbered_coordinate_precision: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            distance_cutoff: 20.0,
            root_path: PathBuf::from("./data"),
            data_source: PathBuf::from("./pdb"),
            number_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_results: 10_000,
            update_chunk_size: 400,
            max_motif_size: 10,
            renumbered_coordinate_precision: 1,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.distance_cutoff.is_finite() && self.distance_cutoff > 0.0) {
            return Err(Error::invalid(
                "distance_cutoff",
                format!("must be a positive number, got {}", self.distance_cutoff),
            ));
        }
        if self.distance_cutoff >= u8::MAX as f64 {
            return Err(Error::invalid(
                "distance_cutoff",
                format!("must be below {} Å", u8::MAX),
            ));
        }
        if self.number_threads == 0 {
            return Err(Error::invalid("number_threads", "must be at least 1"));
        }
        if self.update_chunk_size == 0 {
            return Err(Error::invalid("update_chunk_size", "must be at least 1"));
        }
        if self.max_motif_size < 2 {
            return Err(Error::invalid("max_motif_size", "must be at least 2"));
        }
        if self.renumbered_coordinate_precision > MAX_COORDINATE_PRECISION {
            return Err(Error::invalid(
                "renumbered_coordinate_precision",
                format!("must be at most {MAX_COORDINATE_PRECISION} decimal places"),
            ));
        }
        Ok(())
    }

    /// Directory of archived canonical structures inside `root_path`.
    pub fn archive_path(&self) -> PathBuf {
        self.root_path.join(ARCHIVE_DIR)
    }

    /// Checks a query motif's residue count against `max_motif_size`.
    pub fn validate_motif_size(&self, residue_count: usize) -> Result<(), Error> {
        if residue_count < 2 {
            return Err(Error::invalid(
                "max_motif_size",
                format!("a motif needs at least 2 residues, got {residue_count}"),
            ));
        }
        if residue_count > self.max_motif_size {
            return Err(Error::invalid(
                "max_motif_size",
                format!(
                    "motif has {residue_count} residues, the limit is {}",
                    self.max_motif_size
                ),
            ));
        }
        Ok(())
    }
}
