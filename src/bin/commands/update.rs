use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Args;
use prettytable::{Table, format, row};

use motif_forge::index::UpdateReport;
use motif_forge::io::{DirectorySource, StructureArchive, identifier_from_path};
use motif_forge::{Settings, StructureIdentifier};

use crate::commands::{open_index, print_boxed_label, run_with_spinner};

/// Indexes structures from the configured data source.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Entry identifiers to index, e.g. 1abc 4hhb.
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,
    /// Index every .cif / .cif.gz file found in the data source directory.
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
    /// Structures per committed batch; defaults to `update_chunk_size`.
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,
}

pub fn run(settings: &Settings, args: &UpdateArgs) -> Result<()> {
    let ids = if args.all {
        scan_data_source(&settings.data_source)?
    } else {
        args.ids
            .iter()
            .map(|id| StructureIdentifier::new(id))
            .collect()
    };
    if ids.is_empty() {
        bail!("No structures to index. Pass entry identifiers or --all.");
    }

    let chunk_size = args.chunk_size.unwrap_or(settings.update_chunk_size);
    let archive = StructureArchive::new(
        settings.archive_path(),
        settings.renumbered_coordinate_precision,
    );
    let index = open_index(settings)?.with_archive(archive);
    let source = DirectorySource::new(settings.data_source.clone());

    let message = format!("Indexing {} structures", ids.len());
    let report = run_with_spinner(&message, || {
        index
            .update_from_source(&source, &ids, chunk_size)
            .context("Index update failed")
    })?;

    let total = index.structure_count().context("Failed to count indexed structures")?;
    print_report(&report, total)
}

fn scan_data_source(root: &Path) -> Result<Vec<StructureIdentifier>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed to list data source {}", root.display()))?;

    let mut ids = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list data source {}", root.display()))?
            .path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if name.ends_with(".cif") || name.ends_with(".cif.gz") {
            ids.push(identifier_from_path(&path));
        }
    }
    ids.sort();
    ids.dedup();
    Ok(ids)
}

fn print_report(report: &UpdateReport, total: usize) -> Result<()> {
    let mut stderr = io::stderr().lock();

    print_boxed_label(&mut stderr, "MotifForge Update Report")?;
    writeln!(&mut stderr)?;

    let mut summary = Table::new();
    summary.set_format(*format::consts::FORMAT_BOX_CHARS);
    summary.set_titles(row!["Metric", "Value"]);
    summary.add_row(row!["Indexed", report.indexed]);
    summary.add_row(row!["Skipped (already indexed)", report.skipped]);
    summary.add_row(row!["Failed", report.failed.len()]);
    summary.add_row(row!["Descriptor Buckets Touched", report.descriptors]);
    summary.add_row(row!["Occurrences Written", report.occurrences]);
    summary.add_row(row!["Structures In Index", total]);
    summary
        .print(&mut stderr)
        .context("Failed to render update summary")?;

    if !report.failed.is_empty() {
        writeln!(&mut stderr)?;
        print_boxed_label(&mut stderr, "Failures")?;
        let mut failures = Table::new();
        failures.set_format(*format::consts::FORMAT_BOX_CHARS);
        failures.set_titles(row!["Structure", "Error"]);
        for (id, error) in &report.failed {
            failures.add_row(row![id, error]);
        }
        failures
            .print(&mut stderr)
            .context("Failed to render failure list")?;
    }

    Ok(())
}
