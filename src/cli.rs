use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::registry::Mode;

#[derive(Debug, Parser)]
#[command(author, version, about = "Normalize fleet spreadsheet exports into contract CSV bundles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the output tables and required columns for an operating mode
    Columns(ColumnsArgs),
    /// Load input files and propose a raw-label to logical-column mapping
    Suggest(SuggestArgs),
    /// Apply a confirmed mapping and write the bundle of contract CSVs
    Process(ProcessArgs),
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Operating mode whose contract to display
    #[arg(long, value_enum)]
    pub mode: Mode,
}

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Operating mode whose logical columns to match against
    #[arg(long, value_enum)]
    pub mode: Mode,

    /// Write the proposed mapping to this YAML document for review and reuse
    #[arg(long, short)]
    pub mapping: Option<PathBuf>,

    /// Input CSV or spreadsheet files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Operating mode selecting the contract and mandatory fields
    #[arg(long, value_enum)]
    pub mode: Mode,

    /// Mapping document (as written by `suggest`, possibly hand-edited)
    #[arg(long, short)]
    pub mapping: PathBuf,

    /// Path of the output zip archive
    #[arg(long, short)]
    pub output: PathBuf,

    /// Input CSV or spreadsheet files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}
