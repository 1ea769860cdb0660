//! Arrow IPC *stream* encoding of a table.
//!
//! The stream holds the schema message, a single record batch with every row
//! of the table, and the end-of-stream marker. The encoder is sink-shaped so
//! callers can hand it a socket-backed writer; today the server collects it
//! into a `Vec<u8>`.

use std::io::{Cursor, Write};

use arrow::{
    error::ArrowError,
    ipc::{reader::StreamReader, writer::StreamWriter},
};
use snafu::prelude::*;

use crate::table::{Table, TableError};

/// Media type of an Arrow IPC stream.
pub const ARROW_STREAM_MIME: &str = "application/vnd.apache.arrow.stream";

/// Result alias for IPC stream encoding.
pub type IpcStreamResult<T> = Result<T, IpcStreamError>;

/// Errors produced while encoding or decoding an IPC stream.
#[derive(Debug, Snafu)]
pub enum IpcStreamError {
    /// The table could not be collapsed into a single batch.
    #[snafu(display("{source}"))]
    Collect {
        /// Underlying table error.
        source: TableError,
    },

    /// Arrow failed to write the stream.
    #[snafu(display("Failed to encode Arrow IPC stream: {source}"))]
    Encode {
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// Arrow failed to read the stream.
    #[snafu(display("Failed to decode Arrow IPC stream: {source}"))]
    Decode {
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// The decoded batches did not form a table.
    #[snafu(display("{source}"))]
    Assemble {
        /// Underlying table error.
        source: TableError,
    },
}

/// Encode `table` into `sink` and return the sink once the stream is closed.
pub fn write_ipc_stream<W: Write>(table: &Table, sink: W) -> IpcStreamResult<W> {
    let batch = table.to_single_batch().context(CollectSnafu)?;

    let mut writer = StreamWriter::try_new(sink, &table.schema()).context(EncodeSnafu)?;
    writer.write(&batch).context(EncodeSnafu)?;
    writer.finish().context(EncodeSnafu)?;
    writer.into_inner().context(EncodeSnafu)
}

/// Encode `table` into an in-memory buffer.
pub fn encode_ipc_stream(table: &Table) -> IpcStreamResult<Vec<u8>> {
    write_ipc_stream(table, Vec::new())
}

/// Decode an IPC stream back into a table.
pub fn decode_ipc_stream(bytes: &[u8]) -> IpcStreamResult<Table> {
    let reader = StreamReader::try_new(Cursor::new(bytes), None).context(DecodeSnafu)?;
    let schema = reader.schema();
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context(DecodeSnafu)?;

    Table::try_new(schema, batches).context(AssembleSnafu)
}
