use crate::utils::parallel::PoolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error for index file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt bucket '{}' at line {line_number}: {details}", path.display())]
    CorruptBucket {
        path: PathBuf,
        line_number: usize,
        details: String,
    },

    #[error("failed to read or write structure registry '{}': {source}", path.display())]
    Registry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "index was built with a distance cutoff of {stored} Å, but {requested} Å was requested"
    )]
    CutoffMismatch { stored: f64, requested: f64 },

    #[error("index lock '{resource}' was poisoned by a panicking writer")]
    Poisoned { resource: &'static str },

    #[error(transparent)]
    WorkerPool(#[from] PoolError),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt_bucket(
        path: impl Into<PathBuf>,
        line_number: usize,
        details: impl Into<String>,
    ) -> Self {
        Self::CorruptBucket {
            path: path.into(),
            line_number,
            details: details.into(),
        }
    }

    pub fn registry(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Registry {
            path: path.into(),
            source,
        }
    }

    pub fn cutoff_mismatch(stored: f64, requested: f64) -> Self {
        Self::CutoffMismatch { stored, requested }
    }

    pub fn poisoned(resource: &'static str) -> Self {
        Self::Poisoned { resource }
    }
}
