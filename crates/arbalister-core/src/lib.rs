//! Core pieces shared by the arbalister server and data generator.
//!
//! This crate provides:
//!
//! - The format registry (`formats` module): a closed set of on-disk file
//!   formats, resolved from a file extension or an explicit token, together with
//!   the read/write capabilities each format has in this build.
//! - The `Table` type (`table` module): an immutable Arrow schema plus record
//!   batches, the unit that is read from and written to files.
//! - Table writers (`writer` module) that serialize a `Table` into any writable
//!   format, either into an arbitrary sink or into a file via an atomic
//!   temp-file-then-rename output sink (`storage` module).
//! - Arrow IPC stream encoding (`ipc_stream` module) used to ship a table over
//!   HTTP.
//!
//! Reading files into a `Table` requires a query engine and lives in the
//! `arbalister-datafusion` crate, which keeps DataFusion types out of this one.
#![deny(missing_docs)]

pub mod formats;
pub mod ipc_stream;
pub mod storage;
pub mod table;
pub mod writer;

pub use formats::{Capabilities, FileFormat, FormatError};
pub use table::{Table, TableError};
pub use writer::{TableWriter, WriteError, get_table_writer, write_table_to};
