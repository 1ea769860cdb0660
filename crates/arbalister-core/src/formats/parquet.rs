//! Parquet output via the `parquet` crate's Arrow writer.

use std::io::Write;

use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};
use snafu::ResultExt;

use crate::{
    table::Table,
    writer::{ParquetSnafu, WriteResult},
};

/// Write `table` as a single Parquet file.
pub(crate) fn write_parquet<W: Write + Send>(table: &Table, sink: W) -> WriteResult<()> {
    let props = WriterProperties::builder().build();
    let mut writer =
        ArrowWriter::try_new(sink, table.schema(), Some(props)).context(ParquetSnafu)?;

    for batch in table.batches() {
        writer.write(batch).context(ParquetSnafu)?;
    }

    writer.close().context(ParquetSnafu)?;
    Ok(())
}
