mod archive;
mod assembly;
mod context;
mod error;
mod records;
mod source;

mod mmcif {
    pub mod reader;
    pub mod writer;
}

pub use mmcif::reader::read as read_mmcif_records;
pub use mmcif::writer::write_structure as write_mmcif_structure;

pub use archive::StructureArchive;
pub use assembly::build as build_structure;
pub use records::{AssemblyGenerator, AtomRecord, OperatorDeclaration, RawStructure};
pub use source::{
    DirectorySource, StructureSource, identifier_from_path, read_structure, read_structure_file,
};

pub use context::IoContext;

pub use error::Error;
