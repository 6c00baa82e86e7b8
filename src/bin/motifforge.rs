use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{info, lookup, update};

#[derive(Parser, Debug)]
#[command(
    name = "motifforge",
    about = "A command-line tool for building and querying a geometric residue-pair index of macromolecular structures.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    /// Settings file (TOML). When omitted, built-in defaults are used.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a structure as the indexer would and report its contents.
    Info(info::InfoArgs),
    /// Index structures from the data source into the on-disk index.
    Update(update::UpdateArgs),
    /// Search the index for residue pairs matching a query pair.
    Lookup(lookup::LookupArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = commands::load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Info(args) => info::run(&settings, &args)?,
        Command::Update(args) => update::run(&settings, &args)?,
        Command::Lookup(args) => lookup::run(&settings, &args)?,
    }

    Ok(())
}
