use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use motif_forge::motif::codec::DescriptorCodec;
use motif_forge::{Chain, PolymerKind, Settings, Structure};

use crate::commands::{load_structure, print_boxed_label, run_with_spinner};

/// Report-only command that reads a structure the way the indexer does.
#[derive(Debug, Args)]
pub struct InfoArgs {
    /// mmCIF file to inspect (plain or gzip-compressed).
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
}

/// Reads the structure and prints its chains and describable residue pairs.
pub fn run(settings: &Settings, args: &InfoArgs) -> Result<()> {
    let (structure, pair_count) = run_with_spinner("Reading structure", || {
        let structure = load_structure(&args.input, None)?;
        let pairs = DescriptorCodec::from_settings(settings).pairs(&structure).len();
        Ok((structure, pairs))
    })?;

    let reports = collect_chain_reports(&structure);
    print_tables(&structure, &reports, pair_count, settings.distance_cutoff)
}

fn collect_chain_reports(structure: &Structure) -> Vec<ChainReport> {
    structure
        .iter_chains()
        .map(|chain| ChainReport {
            id: chain.id.to_string(),
            residues: chain.residue_count(),
            atoms: chain.atom_count(),
            polymer: classify_chain(chain),
        })
        .collect()
}

fn classify_chain(chain: &Chain) -> PolymerType {
    let mut protein = false;
    let mut nucleic = false;
    let mut other = false;

    for residue in chain.iter_residues() {
        match residue.residue_type().kind() {
            PolymerKind::Protein => protein = true,
            PolymerKind::Nucleic => nucleic = true,
            PolymerKind::Other => other = true,
        }
    }

    match (protein, nucleic, other) {
        (false, false, false) => PolymerType::Empty,
        (true, false, false) => PolymerType::Protein,
        (false, true, false) => PolymerType::Nucleic,
        (false, false, true) => PolymerType::Unknown,
        _ => PolymerType::Mixed,
    }
}

fn print_tables(
    structure: &Structure,
    reports: &[ChainReport],
    pair_count: usize,
    cutoff: f64,
) -> Result<()> {
    let mut stderr = io::stderr().lock();

    print_boxed_label(&mut stderr, "MotifForge Structure Report")?;
    writeln!(&mut stderr)?;

    let mut chain_table = Table::new();
    print_boxed_label(&mut stderr, "Chain Breakdown")?;
    chain_table.set_format(*format::consts::FORMAT_BOX_CHARS);
    chain_table.set_titles(row!["Chain", "Residues", "Atoms", "Polymer Type"]);
    for report in reports {
        chain_table.add_row(row![
            report.id,
            report.residues,
            report.atoms,
            report.polymer
        ]);
    }
    chain_table
        .print(&mut stderr)
        .context("Failed to render chain summary")?;
    writeln!(&mut stderr)?;

    let mut summary_table = Table::new();
    print_boxed_label(&mut stderr, "Structure Summary")?;
    summary_table.set_format(*format::consts::FORMAT_BOX_CHARS);
    summary_table.set_titles(row!["Metric", "Value"]);
    summary_table.add_row(row!["Identifier", structure.id]);
    summary_table.add_row(row!["Chains", structure.chain_count()]);
    summary_table.add_row(row!["Residues", structure.residue_count()]);
    summary_table.add_row(row!["Atoms", structure.atom_count()]);
    summary_table.add_row(row![
        format!("Residue Pairs ≤ {cutoff:.1} Å"),
        pair_count
    ]);
    summary_table
        .print(&mut stderr)
        .context("Failed to render structure summary")?;

    Ok(())
}

#[derive(Debug)]
struct ChainReport {
    id: String,
    residues: usize,
    atoms: usize,
    polymer: PolymerType,
}

#[derive(Debug)]
enum PolymerType {
    Protein,
    Nucleic,
    Unknown,
    Mixed,
    Empty,
}

impl fmt::Display for PolymerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolymerType::Protein => write!(f, "Protein"),
            PolymerType::Nucleic => write!(f, "Nucleic"),
            PolymerType::Unknown => write!(f, "Unknown"),
            PolymerType::Mixed => write!(f, "Mixed"),
            PolymerType::Empty => write!(f, "Empty"),
        }
    }
}
