//! Arrow IPC file output (the Feather v2 on-disk format).
//!
//! This is the random-access *file* variant with a footer; the HTTP payload
//! uses the *stream* variant instead, see [`crate::ipc_stream`].

use std::io::Write;

use arrow::ipc::writer::FileWriter;
use snafu::ResultExt;

use crate::{
    formats::FileFormat,
    table::Table,
    writer::{ArrowSnafu, WriteResult},
};

/// Write `table` as an Arrow IPC file.
pub(crate) fn write_ipc_file<W: Write>(table: &Table, sink: W) -> WriteResult<()> {
    let context = ArrowSnafu {
        format: FileFormat::Ipc,
    };

    let mut writer = FileWriter::try_new(sink, &table.schema()).context(context)?;
    for batch in table.batches() {
        writer.write(batch).context(context)?;
    }
    writer.finish().context(context)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::ipc::reader::FileReader;
    use arrow::record_batch::RecordBatch;
    use std::io::Cursor;
    use std::sync::Arc;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn file_has_arrow_magic_and_reads_back() -> TestResult {
        let schema = Arc::new(Schema::new(vec![Field::new("age", DataType::Int64, false)]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2, 3]))])?;

        let mut out = Vec::new();
        write_ipc_file(&Table::from_batch(batch), &mut out)?;
        assert_eq!(&out[..6], b"ARROW1");

        let reader = FileReader::try_new(Cursor::new(out), None)?;
        let rows: usize = reader
            .map(|b| b.map(|b| b.num_rows()))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .sum();
        assert_eq!(rows, 3);
        Ok(())
    }
}
