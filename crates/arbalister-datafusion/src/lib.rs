//! DataFusion integration for `arbalister-core`.
//!
//! This crate keeps all DataFusion types out of `arbalister-core`. It owns the
//! execution context used to load files ([`new_session_context`]) and the
//! per-format table readers ([`get_table_reader`], [`read_table`]).

mod reader;
mod session;

pub use reader::{ReadError, ReadResult, TableReader, get_table_reader, read_table};
pub use session::{new_session_context, session_config};
