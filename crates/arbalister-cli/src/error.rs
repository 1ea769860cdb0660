use std::path::PathBuf;

use arbalister_core::{FormatError, WriteError};
use arrow::error::ArrowError;
use snafu::Snafu;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Cannot write {}: {source}", path.display()))]
    OutputFormat { path: PathBuf, source: FormatError },

    #[snafu(display("Failed to generate table: {source}"))]
    Generate { source: ArrowError },

    #[snafu(display("Failed to write {}: {source}", path.display()))]
    WriteOutput { path: PathBuf, source: WriteError },
}
