use std::io::{self as stdio, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use motif_forge::index::{FileStore, InvertedIndex};
use motif_forge::io::{IoContext, identifier_from_path, read_structure_file};
use motif_forge::{LabelSelection, Settings, Structure};

pub mod info;
pub mod lookup;
pub mod update;

/// Loads settings from `path`, or the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

/// Reads one structure file, optionally restricted to the given residues.
pub fn load_structure(path: &Path, selection: Option<&[LabelSelection]>) -> Result<Structure> {
    let id = identifier_from_path(path);
    read_structure_file(path, id, &IoContext::new_default(), selection)
        .with_context(|| format!("Failed to read structure from {}", path.display()))
}

/// Opens the on-disk index configured by `settings`.
pub fn open_index(settings: &Settings) -> Result<InvertedIndex<FileStore>> {
    let store = FileStore::open(settings.root_path.clone()).with_context(|| {
        format!(
            "Failed to open index under {}",
            settings.root_path.display()
        )
    })?;
    InvertedIndex::from_settings(store, settings).with_context(|| {
        format!(
            "Failed to open index under {} with a {:.1} Å distance cutoff",
            settings.root_path.display(),
            settings.distance_cutoff
        )
    })
}

/// Wraps long-running operations with a spinner rendered to stderr.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} ✓", message)),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

pub fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> stdio::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}
