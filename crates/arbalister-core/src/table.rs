//! In-memory columnar table.
//!
//! A [`Table`] is an Arrow schema plus zero or more record batches that all
//! share that schema. It is never mutated after construction: readers produce
//! one, writers and the IPC encoder consume it by reference.

use arrow::{
    compute::concat_batches,
    datatypes::{Schema, SchemaRef},
    error::ArrowError,
    record_batch::RecordBatch,
};
use snafu::prelude::*;

/// Result alias for table construction.
pub type TableResult<T> = Result<T, TableError>;

/// Errors produced when assembling a table.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    /// A batch does not match the table schema.
    #[snafu(display(
        "Record batch {index} does not match the table schema (expected {expected}, found {found})"
    ))]
    SchemaMismatch {
        /// Position of the offending batch.
        index: usize,
        /// Rendered table schema.
        expected: String,
        /// Rendered batch schema.
        found: String,
    },

    /// Arrow failed while combining batches.
    #[snafu(display("Failed to combine record batches: {source}"))]
    Concat {
        /// Underlying Arrow error.
        source: ArrowError,
    },
}

fn same_columns(a: &Schema, b: &Schema) -> bool {
    a.fields().len() == b.fields().len()
        && a.fields()
            .iter()
            .zip(b.fields().iter())
            .all(|(x, y)| x.name() == y.name() && x.data_type() == y.data_type())
}

/// Immutable columnar dataset: named, typed, equal-length columns.
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    /// Build a table, checking that every batch carries `schema`.
    ///
    /// Only column names and data types are compared. Nullability and field
    /// metadata may differ between the table schema and its batches.
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> TableResult<Self> {
        for (index, batch) in batches.iter().enumerate() {
            let batch_schema = batch.schema();
            if !same_columns(&schema, &batch_schema) {
                return SchemaMismatchSnafu {
                    index,
                    expected: schema.to_string(),
                    found: batch_schema.to_string(),
                }
                .fail();
            }
        }

        Ok(Self { schema, batches })
    }

    /// Wrap a single record batch.
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    /// Table schema.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Record batches in order.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across all batches.
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// All rows as one record batch. An empty table yields an empty batch with
    /// the table schema.
    pub fn to_single_batch(&self) -> TableResult<RecordBatch> {
        if self.batches.len() == 1 {
            return Ok(self.batches[0].clone());
        }
        concat_batches(&self.schema, &self.batches).context(ConcatSnafu)
    }
}
