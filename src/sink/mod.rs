// parquetrestore/src/sink/mod.rs
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod mysql;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use crate::errors::Result;

/// Append-only writer for destination tables. The target table must already exist.
#[async_trait]
pub trait TableSink: Send {
    /// Appends every row of `batch` to `table` and returns the rows written.
    async fn append(&mut self, table: &str, batch: &RecordBatch) -> Result<u64>;
}
