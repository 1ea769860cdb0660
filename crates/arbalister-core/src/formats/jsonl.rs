//! Newline-delimited JSON output via `arrow-json`.

use std::io::Write;

use arrow_json::LineDelimitedWriter;
use snafu::ResultExt;

use crate::{
    formats::FileFormat,
    table::Table,
    writer::{ArrowSnafu, WriteResult},
};

/// Write `table` as one JSON object per line.
pub(crate) fn write_jsonl<W: Write>(table: &Table, sink: W) -> WriteResult<()> {
    let context = ArrowSnafu {
        format: FileFormat::Jsonl,
    };

    let mut writer = LineDelimitedWriter::new(sink);
    for batch in table.batches() {
        writer.write(batch).context(context)?;
    }
    writer.finish().context(context)?;
    Ok(())
}
