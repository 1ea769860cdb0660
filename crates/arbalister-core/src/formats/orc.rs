//! Apache ORC support through `orc-rust`, compiled only with the `orc`
//! feature.
//!
//! DataFusion has no built-in ORC reader, so unlike the other formats the read
//! side lives here too and is called directly by the engine crate.

use std::{error::Error, io::Write, path::Path};

use snafu::prelude::*;

use crate::{
    formats::FileFormat,
    table::{Table, TableError},
    writer::{OrcSnafu, WriteResult},
};

/// Whether ORC support is compiled in.
pub(crate) const ENABLED: bool = cfg!(feature = "orc");

/// Errors produced while loading an ORC file.
#[derive(Debug, Snafu)]
pub enum OrcReadError {
    /// The file could not be opened.
    #[snafu(display("Failed to open ORC file {path}: {source}"))]
    Open {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file could not be decoded.
    #[snafu(display("Failed to decode ORC file {path}: {source}"))]
    Decode {
        /// File path.
        path: String,
        /// Underlying decoder error.
        source: Box<dyn Error + Send + Sync>,
    },

    /// The decoded batches did not form a table.
    #[snafu(display("Failed to assemble ORC table {path}: {source}"))]
    Assemble {
        /// File path.
        path: String,
        /// Underlying table error.
        source: TableError,
    },

    /// ORC support is not compiled in.
    #[snafu(display("File format '{}' is not enabled in this build", FileFormat::Orc))]
    Disabled,
}

fn boxed<E: Error + Send + Sync + 'static>(e: E) -> Box<dyn Error + Send + Sync> {
    Box::new(e)
}

/// Write `table` as an ORC file.
#[cfg(feature = "orc")]
pub(crate) fn write_orc<W: Write + Send>(table: &Table, sink: W) -> WriteResult<()> {
    use orc_rust::ArrowWriterBuilder;

    let mut writer = ArrowWriterBuilder::new(sink, table.schema())
        .try_build()
        .map_err(boxed)
        .context(OrcSnafu)?;

    for batch in table.batches() {
        writer.write(batch).map_err(boxed).context(OrcSnafu)?;
    }

    writer.close().map_err(boxed).context(OrcSnafu)?;
    Ok(())
}

#[cfg(not(feature = "orc"))]
pub(crate) fn write_orc<W: Write + Send>(_table: &Table, _sink: W) -> WriteResult<()> {
    Err(boxed(OrcReadError::Disabled)).context(OrcSnafu)
}

/// Load the ORC file at `path` into a table.
#[cfg(feature = "orc")]
pub fn read_orc(path: &Path) -> Result<Table, OrcReadError> {
    use arrow::record_batch::RecordBatchReader;
    use orc_rust::ArrowReaderBuilder;

    let path_str = path.display().to_string();
    let file = std::fs::File::open(path).context(OpenSnafu {
        path: path_str.clone(),
    })?;

    let reader = ArrowReaderBuilder::try_new(file)
        .map_err(boxed)
        .context(DecodeSnafu {
            path: path_str.clone(),
        })?
        .build();

    let file_schema = reader.schema();
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(boxed)
        .context(DecodeSnafu {
            path: path_str.clone(),
        })?;

    // The footer schema marks every column nullable while decoded batches
    // carry the real nullability, so the batches win when there are any.
    let schema = batches
        .first()
        .map(|b| b.schema())
        .unwrap_or(file_schema);

    Table::try_new(schema, batches).context(AssembleSnafu { path: path_str })
}

/// Load the ORC file at `path` into a table.
#[cfg(not(feature = "orc"))]
pub fn read_orc(_path: &Path) -> Result<Table, OrcReadError> {
    DisabledSnafu.fail()
}
