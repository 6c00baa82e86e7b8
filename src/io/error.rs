use crate::model::identifier::StructureIdentifier;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "I/O error for {path_desc}: {source}",
        path_desc = PathDisplay(path)
    )]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "failed to parse {format} {path_desc}: {details} (line {line_number})",
        path_desc = PathDisplay(path)
    )]
    Parse {
        format: &'static str,
        path: Option<PathBuf>,
        line_number: usize,
        details: String,
    },

    #[error(
        "unsupported model numbering in structure '{structure}': first model is {model}, expected 1"
    )]
    UnsupportedModelNumbering {
        structure: StructureIdentifier,
        model: i32,
    },

    #[error(
        "inconsistent data in {format} {path_desc}: {details}",
        path_desc = PathDisplay(path)
    )]
    InconsistentData {
        format: &'static str,
        path: Option<PathBuf>,
        details: String,
    },

    #[error("no structure data found for '{structure}' under '{}'", root.display())]
    NotFound {
        structure: StructureIdentifier,
        root: PathBuf,
    },
}

impl Error {
    pub fn from_io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { path, source }
    }

    pub fn parse(
        format: &'static str,
        path: Option<PathBuf>,
        line_number: usize,
        details: impl Into<String>,
    ) -> Self {
        Self::Parse {
            format,
            path,
            line_number,
            details: details.into(),
        }
    }

    pub fn unsupported_model_numbering(structure: StructureIdentifier, model: i32) -> Self {
        Self::UnsupportedModelNumbering { structure, model }
    }

    pub fn inconsistent_data(
        format: &'static str,
        path: Option<PathBuf>,
        details: impl Into<String>,
    ) -> Self {
        Self::InconsistentData {
            format,
            path,
            details: details.into(),
        }
    }

    pub fn not_found(structure: StructureIdentifier, root: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            structure,
            root: root.into(),
        }
    }

    /// Attaches a source path to path-aware variants that were raised on a bare stream.
    pub fn with_path(self, source_path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Io { path: None, source } => Self::Io {
                path: Some(source_path.into()),
                source,
            },
            Self::Parse {
                format,
                path: None,
                line_number,
                details,
            } => Self::Parse {
                format,
                path: Some(source_path.into()),
                line_number,
                details,
            },
            Self::InconsistentData {
                format,
                path: None,
                details,
            } => Self::InconsistentData {
                format,
                path: Some(source_path.into()),
                details,
            },
            other => other,
        }
    }
}

struct PathDisplay<'a>(&'a Option<PathBuf>);

impl<'a> fmt::Display for PathDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "file '{}'", p.display()),
            None => write!(f, "stream source"),
        }
    }
}
