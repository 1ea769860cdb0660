//! `arbalister-generate`: write a table of fake people to one or more files.

mod error;
mod generate;

use std::path::{Path, PathBuf};

use arbalister_core::{FileFormat, TableWriter, get_table_writer};
use clap::Parser;
use snafu::ResultExt;

use crate::error::{CliResult, GenerateSnafu, OutputFormatSnafu, WriteOutputSnafu};
use crate::generate::generate_table;

/// Generate a table of fake data and write it to file(s).
///
/// With a single `-o` one file is written. Repeating `-o` writes the same
/// table to every path.
#[derive(Debug, Parser)]
#[command(name = "arbalister-generate", version, about)]
struct Cli {
    /// Output file path (repeatable).
    #[arg(short = 'o', long = "output-file", required = true)]
    output_files: Vec<PathBuf>,

    /// Output format for every file (csv, parquet, ipc, jsonl, orc).
    /// Inferred from each file extension when omitted.
    #[arg(short = 't', long = "output-type")]
    output_type: Option<FileFormat>,

    /// Number of rows to generate.
    #[arg(long, default_value_t = 1000)]
    num_rows: usize,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

/// Pick a writer for every output before any data is generated.
fn plan_outputs(
    paths: &[PathBuf],
    explicit: Option<FileFormat>,
) -> CliResult<Vec<(&Path, TableWriter)>> {
    paths
        .iter()
        .map(|path| {
            let writer = explicit
                .map_or_else(|| FileFormat::from_path(path), Ok)
                .and_then(get_table_writer)
                .context(OutputFormatSnafu { path: path.clone() })?;
            Ok((path.as_path(), writer))
        })
        .collect()
}

async fn run(cli: Cli) -> CliResult<()> {
    let outputs = plan_outputs(&cli.output_files, cli.output_type)?;

    let table = generate_table(cli.num_rows).context(GenerateSnafu)?;
    tracing::info!(
        rows = table.num_rows(),
        outputs = outputs.len(),
        "generated table"
    );

    for (path, writer) in outputs {
        writer
            .write(&table, path)
            .await
            .context(WriteOutputSnafu { path })?;
        tracing::info!(path = %path.display(), format = %writer.format(), "wrote output");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
