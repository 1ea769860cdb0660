use std::{io, path::Path};

use arbalister_core::{
    FileFormat, FormatError, Table, TableError, formats::orc::OrcReadError,
};
use datafusion::{
    dataframe::DataFrame,
    datasource::file_format::options::ArrowReadOptions,
    error::DataFusionError,
    prelude::{
        AvroReadOptions, CsvReadOptions, NdJsonReadOptions, ParquetReadOptions, SessionContext,
    },
};
use snafu::prelude::*;

/// Result alias for table readers.
pub type ReadResult<T> = Result<T, ReadError>;

/// Errors produced while loading a file into a [`Table`].
#[derive(Debug, Snafu)]
pub enum ReadError {
    /// The format cannot be read in this build.
    #[snafu(display("{source}"))]
    Format {
        /// Underlying registry error.
        source: FormatError,
    },

    /// The source file does not exist or is not accessible.
    #[snafu(display("File not found or not accessible: {path}"))]
    FileNotFound {
        /// Requested path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The path exists but is not a regular file.
    #[snafu(display("Not a regular file: {path}"))]
    NotAFile {
        /// Requested path.
        path: String,
    },

    /// DataFusion failed to plan or execute the scan.
    #[snafu(display("Failed to read {format} file {path}: {source}"))]
    Query {
        /// Format of the file.
        format: FileFormat,
        /// File path.
        path: String,
        /// Underlying DataFusion error.
        #[snafu(source(from(DataFusionError, Box::new)))]
        source: Box<DataFusionError>,
    },

    /// The scanned batches did not form a table.
    #[snafu(display("Failed to assemble table from {path}: {source}"))]
    Assemble {
        /// File path.
        path: String,
        /// Underlying table error.
        source: TableError,
    },

    /// ORC decoding failed.
    #[snafu(display("{source}"))]
    Orc {
        /// Underlying ORC error.
        source: OrcReadError,
    },

    /// The blocking ORC task did not complete.
    #[snafu(display("ORC read task failed for {path}: {source}"))]
    Task {
        /// File path.
        path: String,
        /// Underlying join error.
        source: tokio::task::JoinError,
    },
}

/// Loads tables from files of one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableReader {
    format: FileFormat,
}

/// Look up the reader for `format`, failing if the format cannot be read.
pub fn get_table_reader(format: FileFormat) -> Result<TableReader, FormatError> {
    format.ensure_readable()?;
    Ok(TableReader { format })
}

impl TableReader {
    /// Format read by this reader.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load the file at `path` using `ctx`.
    pub async fn read(&self, ctx: &SessionContext, path: &Path) -> ReadResult<Table> {
        read_table(ctx, self.format, path).await
    }
}

/// DataFusion only accepts a single-file path whose name ends with the
/// configured extension, so the options carry the file's own suffix.
fn listing_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

async fn ensure_regular_file(path: &Path, path_str: &str) -> ReadResult<()> {
    let meta = tokio::fs::metadata(path).await.context(FileNotFoundSnafu {
        path: path_str.to_string(),
    })?;
    ensure!(
        meta.is_file(),
        NotAFileSnafu {
            path: path_str.to_string(),
        }
    );
    Ok(())
}

async fn collect_table(df: DataFrame, format: FileFormat, path: &str) -> ReadResult<Table> {
    let logical_schema = df.schema().inner().clone();
    let batches = df.collect().await.context(QuerySnafu {
        format,
        path: path.to_string(),
    })?;

    // Physical batches are authoritative when there are any.
    let schema = batches
        .first()
        .map(|b| b.schema())
        .unwrap_or(logical_schema);

    Table::try_new(schema, batches).context(AssembleSnafu {
        path: path.to_string(),
    })
}

/// Load the file at `path` as `format` into a [`Table`].
pub async fn read_table(ctx: &SessionContext, format: FileFormat, path: &Path) -> ReadResult<Table> {
    format.ensure_readable().context(FormatSnafu)?;

    let path_str = path.display().to_string();
    ensure_regular_file(path, &path_str).await?;

    let ext = listing_extension(path);
    let loaded = match format {
        FileFormat::Csv => {
            ctx.read_csv(path_str.as_str(), CsvReadOptions::new().file_extension(&ext))
                .await
        }
        FileFormat::Parquet => {
            let options = ParquetReadOptions {
                file_extension: &ext,
                ..Default::default()
            };
            ctx.read_parquet(path_str.as_str(), options).await
        }
        FileFormat::Ipc => {
            let options = ArrowReadOptions {
                file_extension: &ext,
                ..Default::default()
            };
            ctx.read_arrow(path_str.as_str(), options).await
        }
        FileFormat::Jsonl => {
            ctx.read_json(
                path_str.as_str(),
                NdJsonReadOptions::default().file_extension(&ext),
            )
            .await
        }
        FileFormat::Avro => {
            let options = AvroReadOptions {
                file_extension: &ext,
                ..Default::default()
            };
            ctx.read_avro(path_str.as_str(), options).await
        }
        FileFormat::Orc => return read_orc(path).await,
    };

    let df = loaded.context(QuerySnafu {
        format,
        path: path_str.clone(),
    })?;
    let table = collect_table(df, format, &path_str).await?;

    log::debug!(
        "loaded {} rows x {} columns from {path_str} as {format}",
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}

async fn read_orc(path: &Path) -> ReadResult<Table> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || arbalister_core::formats::orc::read_orc(&owned))
        .await
        .context(TaskSnafu {
            path: path.display().to_string(),
        })?
        .context(OrcSnafu)
}
