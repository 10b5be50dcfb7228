pub mod archive;
pub mod cli;
pub mod data;
pub mod error;
pub mod extract;
pub mod loader;
pub mod mapping;
pub mod matcher;
pub mod registry;
pub mod session;
pub mod table;

use std::{env, fs, path::PathBuf, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, error, info};

use crate::{
    cli::{Cli, Commands},
    loader::SourceFile,
    mapping::ColumnMapping,
    session::Session,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("fleet_intake", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Columns(args) => handle_columns(&args),
        Commands::Suggest(args) => handle_suggest(&args),
        Commands::Process(args) => handle_process(&args),
    }
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let contract = registry::contract_for(args.mode);
    let mandatory = registry::mandatory_fields(args.mode);

    let mut rows = Vec::new();
    for spec in contract.tables {
        for (idx, column) in spec.columns.iter().enumerate() {
            let flag = if mandatory.contains(column) { "yes" } else { "" };
            rows.push(vec![
                spec.name.to_string(),
                (idx + 1).to_string(),
                (*column).to_string(),
                flag.to_string(),
            ]);
        }
    }
    let headers = vec![
        "table".to_string(),
        "#".to_string(),
        "column".to_string(),
        "mandatory".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!(
        "Contract '{}' defines {} output table(s)",
        args.mode,
        contract.tables.len()
    );
    Ok(())
}

fn handle_suggest(args: &cli::SuggestArgs) -> Result<()> {
    let files = read_sources(&args.inputs)?;
    let mut session = Session::new(args.mode);
    let records = session.ingest(&files)?;
    info!(
        "Loaded {} row(s) across {} raw column(s)",
        records.row_count(),
        records.columns().len()
    );

    let proposals = session.propose()?;
    let mut rows = Vec::with_capacity(proposals.len());
    let mut resolved = 0usize;
    for (logical, proposal) in &proposals {
        let (raw, tier) = match proposal {
            Some((raw, tier)) => {
                resolved += 1;
                (raw.clone(), tier.label().to_string())
            }
            None => ("-".to_string(), String::new()),
        };
        rows.push(vec![logical.clone(), raw, tier]);
    }
    let headers = vec![
        "logical".to_string(),
        "suggested label".to_string(),
        "match".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!("Matched {resolved} of {} logical column(s)", proposals.len());

    if let Some(path) = &args.mapping {
        let mapping = session.proposed_mapping()?;
        mapping.save(path)?;
        info!("Proposed mapping written to {path:?}; review before processing");
    }
    Ok(())
}

fn handle_process(args: &cli::ProcessArgs) -> Result<()> {
    let files = read_sources(&args.inputs)?;
    let mapping = ColumnMapping::load(&args.mapping)?;

    let mut session = Session::new(args.mode);
    session.ingest(&files)?;
    session.confirm(mapping)?;
    let outcome = session.extract()?;

    if !outcome.is_success() {
        for (tab, missing) in outcome.failures() {
            error!("table '{tab}' is missing column(s): {}", missing.join(", "));
        }
        return Err(anyhow!(
            "{} of {} table(s) could not be extracted; no archive was written",
            outcome.failures().len(),
            outcome.tables.len()
        ));
    }

    for tab in outcome.extracted() {
        info!("Extracted '{}' with {} unique row(s)", tab.name, tab.rows.len());
    }
    let bytes = archive::pack(outcome.extracted())?;
    fs::write(&args.output, bytes)
        .with_context(|| format!("Writing archive to {:?}", args.output))?;
    info!(
        "Archive with {} table(s) written to {:?}",
        outcome.tables.len(),
        args.output
    );
    Ok(())
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths.iter().map(|path| SourceFile::from_path(path)).collect()
}
