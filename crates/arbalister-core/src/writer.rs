//! Table writers.
//!
//! [`write_table_to`] serializes a [`Table`] into any `Write` sink in the
//! requested format. [`TableWriter`] is the file-level entry point: it opens an
//! output sink for the destination (creating parent directories), streams the
//! table into it and commits the file atomically.

use std::{
    error::Error,
    io::Write,
    path::Path,
};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use snafu::prelude::*;

use crate::{
    formats::{self, FileFormat, FormatError},
    storage::{StorageError, open_output_sink},
    table::Table,
};

/// Result alias for table writers.
pub type WriteResult<T> = Result<T, WriteError>;

/// Errors produced while writing a table.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WriteError {
    /// The format cannot be written in this build.
    #[snafu(display("{source}"))]
    Format {
        /// Underlying registry error.
        source: FormatError,
    },

    /// Arrow failed to encode a batch.
    #[snafu(display("Failed to encode {format} output: {source}"))]
    Arrow {
        /// Format being written.
        format: FileFormat,
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// The Parquet writer failed.
    #[snafu(display("Failed to encode parquet output: {source}"))]
    Parquet {
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// The ORC writer failed.
    #[snafu(display("Failed to encode orc output: {source}"))]
    Orc {
        /// Underlying ORC error.
        source: Box<dyn Error + Send + Sync>,
    },

    /// CSV cannot represent a nested column.
    #[snafu(display("CSV output does not support column '{field}' of type {data_type}"))]
    CsvUnsupportedType {
        /// Column name.
        field: String,
        /// Rendered Arrow type.
        data_type: String,
    },

    /// Opening or committing the destination file failed.
    #[snafu(display("{source}"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },
}

/// Serialize `table` into `sink` using `format`.
pub fn write_table_to(
    format: FileFormat,
    table: &Table,
    sink: &mut (dyn Write + Send),
) -> WriteResult<()> {
    format.ensure_writable().context(FormatSnafu)?;

    match format {
        FileFormat::Csv => formats::csv::write_csv(table, sink),
        FileFormat::Parquet => formats::parquet::write_parquet(table, sink),
        FileFormat::Ipc => formats::ipc::write_ipc_file(table, sink),
        FileFormat::Jsonl => formats::jsonl::write_jsonl(table, sink),
        FileFormat::Orc => formats::orc::write_orc(table, sink),
        FileFormat::Avro => Err(FormatError::Unsupported {
            format,
            operation: "writing",
        })
        .context(FormatSnafu),
    }
}

/// Writes tables to files of one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWriter {
    format: FileFormat,
}

/// Look up the writer for `format`, failing if the format cannot be written.
pub fn get_table_writer(format: FileFormat) -> Result<TableWriter, FormatError> {
    format.ensure_writable()?;
    Ok(TableWriter { format })
}

impl TableWriter {
    /// Format produced by this writer.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Write `table` to `path`, creating missing parent directories.
    ///
    /// The destination only appears once the whole table has been encoded.
    pub async fn write(&self, table: &Table, path: &Path) -> WriteResult<()> {
        let mut sink = open_output_sink(path).await.context(StorageSnafu)?;
        write_table_to(self.format, table, sink.writer())?;
        sink.finish().await.context(StorageSnafu)?;

        log::debug!(
            "wrote {} rows as {} to {}",
            table.num_rows(),
            self.format,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn people() -> Result<Table, ArrowError> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("age", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Ada Byron", "Alan Turing"])),
                Arc::new(Int64Array::from(vec![36, 41])),
            ],
        )?;
        Ok(Table::from_batch(batch))
    }

    #[test]
    fn avro_has_no_writer() {
        let err = get_table_writer(FileFormat::Avro).unwrap_err();
        assert!(matches!(err, FormatError::Unsupported { .. }));
    }

    #[test]
    fn every_writable_format_encodes_bytes() -> TestResult {
        let table = people()?;
        for format in FileFormat::enabled().filter(|f| f.capabilities().write) {
            let mut buf: Vec<u8> = Vec::new();
            write_table_to(format, &table, &mut buf)?;
            assert!(!buf.is_empty(), "{format} produced no bytes");
        }
        Ok(())
    }

    #[tokio::test]
    async fn writer_creates_missing_directories() -> TestResult {
        let tmp = TempDir::new()?;
        let dest = tmp.path().join("deep/er/people.parquet");

        let writer = get_table_writer(FileFormat::Parquet)?;
        writer.write(&people()?, &dest).await?;

        let bytes = std::fs::read(&dest)?;
        assert_eq!(&bytes[..4], b"PAR1");
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_leaves_no_destination() -> TestResult {
        let tmp = TempDir::new()?;
        let dest = tmp.path().join("nested.csv");

        let schema = Arc::new(Schema::new(vec![Field::new(
            "tags",
            DataType::new_list(DataType::Utf8, true),
            true,
        )]));
        let table = Table::try_new(schema, Vec::new())?;

        let err = get_table_writer(FileFormat::Csv)?
            .write(&table, &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::CsvUnsupportedType { .. }));
        assert!(!dest.exists());
        Ok(())
    }
}
