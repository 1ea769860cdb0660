//! CSV output via `arrow-csv`.

use std::io::Write;

use arrow::{datatypes::DataType, datatypes::Schema, record_batch::RecordBatch};
use arrow_csv::WriterBuilder;
use snafu::ResultExt;

use crate::{
    formats::FileFormat,
    table::Table,
    writer::{ArrowSnafu, CsvUnsupportedTypeSnafu, WriteResult},
};

/// The Arrow CSV writer does not support list, struct, map or union columns.
fn ensure_csv_supported(schema: &Schema) -> WriteResult<()> {
    for field in schema.fields() {
        let dt = field.data_type();
        let unsupported = matches!(
            dt,
            DataType::List(_)
                | DataType::LargeList(_)
                | DataType::FixedSizeList(_, _)
                | DataType::Struct(_)
                | DataType::Map(_, _)
                | DataType::Union(_, _)
        );

        if unsupported {
            return CsvUnsupportedTypeSnafu {
                field: field.name().to_string(),
                data_type: format!("{dt:?}"),
            }
            .fail();
        }
    }

    Ok(())
}

/// Write `table` as CSV with a header row.
pub(crate) fn write_csv<W: Write>(table: &Table, sink: W) -> WriteResult<()> {
    let schema = table.schema();
    ensure_csv_supported(&schema)?;

    let mut writer = WriterBuilder::new().with_header(true).build(sink);

    // The header is emitted with the first batch, so an empty table still
    // needs one (empty) batch to produce it.
    if table.batches().is_empty() {
        let empty = RecordBatch::new_empty(schema);
        writer.write(&empty).context(ArrowSnafu {
            format: FileFormat::Csv,
        })?;
    }

    for batch in table.batches() {
        writer.write(batch).context(ArrowSnafu {
            format: FileFormat::Csv,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::Field;
    use std::sync::Arc;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn quotes_values_containing_commas() -> TestResult {
        let schema = Arc::new(Schema::new(vec![
            Field::new("address", DataType::Utf8, false),
            Field::new("age", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["1 Main St, Springfield"])),
                Arc::new(Int64Array::from(vec![7])),
            ],
        )?;

        let mut out = Vec::new();
        write_csv(&Table::from_batch(batch), &mut out)?;

        let text = String::from_utf8(out)?;
        assert_eq!(text, "address,age\n\"1 Main St, Springfield\",7\n");
        Ok(())
    }

    #[test]
    fn empty_table_still_writes_header() -> TestResult {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Utf8, false)]));
        let table = Table::try_new(schema, Vec::new())?;

        let mut out = Vec::new();
        write_csv(&table, &mut out)?;
        assert_eq!(String::from_utf8(out)?, "id\n");
        Ok(())
    }
}
