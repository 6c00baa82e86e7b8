use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

pub type Point = Point3<f64>;

/// Monomer identity of a polymer residue.
///
/// The declaration order defines the canonical ordering used when residue pairs are
/// oriented for the inverted index, so variants must never be reordered once an index
/// has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResidueType {
    ALA,
    ARG,
    ASN,
    ASP,
    CYS,
    GLN,
    GLU,
    GLY,
    HIS,
    ILE,
    LEU,
    LYS,
    MET,
    PHE,
    PRO,
    SER,
    THR,
    TRP,
    TYR,
    VAL,
    A,
    C,
    G,
    U,
    DA,
    DC,
    DG,
    DT,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolymerKind {
    Protein,
    Nucleic,
    Other,
}

impl ResidueType {
    pub const ALL: [ResidueType; 29] = [
        ResidueType::ALA,
        ResidueType::ARG,
        ResidueType::ASN,
        ResidueType::ASP,
        ResidueType::CYS,
        ResidueType::GLN,
        ResidueType::GLU,
        ResidueType::GLY,
        ResidueType::HIS,
        ResidueType::ILE,
        ResidueType::LEU,
        ResidueType::LYS,
        ResidueType::MET,
        ResidueType::PHE,
        ResidueType::PRO,
        ResidueType::SER,
        ResidueType::THR,
        ResidueType::TRP,
        ResidueType::TYR,
        ResidueType::VAL,
        ResidueType::A,
        ResidueType::C,
        ResidueType::G,
        ResidueType::U,
        ResidueType::DA,
        ResidueType::DC,
        ResidueType::DG,
        ResidueType::DT,
        ResidueType::Unknown,
    ];

    /// Stable code used in descriptor keys and bucket names.
    pub fn code(&self) -> &'static str {
        match self {
            ResidueType::ALA => "ALA",
            ResidueType::ARG => "ARG",
            ResidueType::ASN => "ASN",
            ResidueType::ASP => "ASP",
            ResidueType::CYS => "CYS",
            ResidueType::GLN => "GLN",
            ResidueType::GLU => "GLU",
            ResidueType::GLY => "GLY",
            ResidueType::HIS => "HIS",
            ResidueType::ILE => "ILE",
            ResidueType::LEU => "LEU",
            ResidueType::LYS => "LYS",
            ResidueType::MET => "MET",
            ResidueType::PHE => "PHE",
            ResidueType::PRO => "PRO",
            ResidueType::SER => "SER",
            ResidueType::THR => "THR",
            ResidueType::TRP => "TRP",
            ResidueType::TYR => "TYR",
            ResidueType::VAL => "VAL",
            ResidueType::A => "A",
            ResidueType::C => "C",
            ResidueType::G => "G",
            ResidueType::U => "U",
            ResidueType::DA => "DA",
            ResidueType::DC => "DC",
            ResidueType::DG => "DG",
            ResidueType::DT => "DT",
            ResidueType::Unknown => "UNK",
        }
    }

    pub fn one_letter_code(&self) -> char {
        match self {
            ResidueType::ALA => 'A',
            ResidueType::ARG => 'R',
            ResidueType::ASN => 'N',
            ResidueType::ASP => 'D',
            ResidueType::CYS => 'C',
            ResidueType::GLN => 'Q',
            ResidueType::GLU => 'E',
            ResidueType::GLY => 'G',
            ResidueType::HIS => 'H',
            ResidueType::ILE => 'I',
            ResidueType::LEU => 'L',
            ResidueType::LYS => 'K',
            ResidueType::MET => 'M',
            ResidueType::PHE => 'F',
            ResidueType::PRO => 'P',
            ResidueType::SER => 'S',
            ResidueType::THR => 'T',
            ResidueType::TRP => 'W',
            ResidueType::TYR => 'Y',
            ResidueType::VAL => 'V',
            ResidueType::A | ResidueType::DA => 'A',
            ResidueType::C | ResidueType::DC => 'C',
            ResidueType::G | ResidueType::DG => 'G',
            ResidueType::U => 'U',
            ResidueType::DT => 'T',
            ResidueType::Unknown => 'X',
        }
    }

    pub fn kind(&self) -> PolymerKind {
        match self {
            ResidueType::A
            | ResidueType::C
            | ResidueType::G
            | ResidueType::U
            | ResidueType::DA
            | ResidueType::DC
            | ResidueType::DG
            | ResidueType::DT => PolymerKind::Nucleic,
            ResidueType::Unknown => PolymerKind::Other,
            _ => PolymerKind::Protein,
        }
    }

    pub fn is_protein(&self) -> bool {
        self.kind() == PolymerKind::Protein
    }

    pub fn is_nucleic(&self) -> bool {
        self.kind() == PolymerKind::Nucleic
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ResidueType::Unknown)
    }
}

impl fmt::Display for ResidueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ResidueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResidueType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == s)
            .ok_or_else(|| format!("Invalid residue type: {}", s))
    }
}
