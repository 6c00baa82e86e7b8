use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use is_terminal::IsTerminal;
use prettytable::{Table, format, row};

use motif_forge::index::{Hit, Tolerance};
use motif_forge::{LabelSelection, Settings};

use crate::commands::{load_structure, open_index, print_boxed_label, run_with_spinner};

/// Finds indexed structures containing a residue pair with the geometry of a query pair.
#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Structure holding the query residues.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
    /// The two query residues as CHAIN_OPERATOR_POSITION, e.g. A_1_57,A_1_102.
    #[arg(long, value_delimiter = ',', num_args = 2, required = true)]
    pub residues: Vec<LabelSelection>,
    /// Accepted bin shift as BACKBONE,SIDE_CHAIN,ANGLE.
    #[arg(long, value_parser = parse_tolerance, default_value = "0,0,0")]
    pub tolerance: Tolerance,
    /// Maximum number of hits; defaults to `max_results`.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

fn parse_tolerance(value: &str) -> Result<Tolerance, String> {
    let bins = value
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid tolerance '{value}': {e}"))?;
    match bins.as_slice() {
        [backbone, side_chain, angle] => Ok(Tolerance::new(*backbone, *side_chain, *angle)),
        _ => Err(format!(
            "invalid tolerance '{value}': expected BACKBONE,SIDE_CHAIN,ANGLE"
        )),
    }
}

pub fn run(settings: &Settings, args: &LookupArgs) -> Result<()> {
    settings
        .validate_motif_size(args.residues.len())
        .context("Invalid query motif")?;

    let structure = load_structure(&args.input, Some(&args.residues))?;
    let residues = args
        .residues
        .iter()
        .map(|selection| {
            structure
                .find_residue(selection)
                .ok_or_else(|| anyhow!("Residue {selection} not found in {}", structure.id))
        })
        .collect::<Result<Vec<_>>>()?;

    let index = open_index(settings)?;
    let Some(descriptor) = index.codec().descriptor(residues[0], residues[1]) else {
        bail!(
            "Residues {} and {} have no descriptor: they are farther apart than {:.1} Å or lack representative atoms",
            args.residues[0],
            args.residues[1],
            settings.distance_cutoff
        );
    };
    log::info!("Query descriptor {descriptor} (flipped: {})", descriptor.flipped);

    let limit = args.limit.unwrap_or(settings.max_results);
    let hits = run_with_spinner("Searching index", || {
        index
            .lookup(&descriptor, args.tolerance)
            .take(limit)
            .collect::<Result<Vec<Hit>, _>>()
            .context("Index lookup failed")
    })?;

    if io::stdout().is_terminal() {
        print_table(&hits)
    } else {
        write_tsv(&hits)
    }
}

fn print_table(hits: &[Hit]) -> Result<()> {
    let mut stderr = io::stderr().lock();

    print_boxed_label(&mut stderr, "MotifForge Lookup Hits")?;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Structure", "Descriptor", "Residue Pairs"]);
    for hit in hits {
        let descriptor = hit
            .occurrences
            .first()
            .map(|o| o.descriptor.to_string())
            .unwrap_or_default();
        let pairs = hit
            .occurrences
            .iter()
            .map(|o| format!("{} {}", o.first, o.second))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(row![hit.structure, descriptor, pairs]);
    }
    table
        .print(&mut stderr)
        .context("Failed to render lookup hits")?;
    writeln!(&mut stderr, "{} hits", hits.len())?;
    Ok(())
}

fn write_tsv(hits: &[Hit]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for hit in hits {
        for occurrence in &hit.occurrences {
            writeln!(
                stdout,
                "{}\t{}\t{}\t{}",
                hit.structure, occurrence.descriptor, occurrence.first, occurrence.second
            )
            .context("Failed to write lookup hits")?;
        }
    }
    stdout.flush().context("Failed to flush stdout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_parses_three_bins() {
        assert_eq!(parse_tolerance("1, 2,0").unwrap(), Tolerance::new(1, 2, 0));
        assert!(parse_tolerance("1,2").is_err());
        assert!(parse_tolerance("1,x,0").is_err());
    }
}
