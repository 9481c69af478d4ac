// parquetrestore/src/sink/memory.rs
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use super::TableSink;
use crate::errors::{RestoreError, Result};
use crate::restore::decode::merge_batches;

/// Records appended batches per table; tables listed in `failing_tables` reject writes.
#[derive(Default)]
pub struct MemorySink {
    pub appended: HashMap<String, Vec<RecordBatch>>,
    pub failing_tables: HashSet<String>,
    pub append_calls: usize,
}

impl MemorySink {
    pub fn rows(&self, table: &str) -> usize {
        self.appended
            .get(table)
            .map_or(0, |batches| batches.iter().map(RecordBatch::num_rows).sum())
    }

    /// Everything appended to `table`, concatenated in append order.
    pub fn table(&self, table: &str) -> RecordBatch {
        merge_batches(self.appended.get(table).map_or(&[][..], Vec::as_slice))
            .expect("appended batches share a schema")
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn append(&mut self, table: &str, batch: &RecordBatch) -> Result<u64> {
        self.append_calls += 1;
        if self.failing_tables.contains(table) {
            return Err(RestoreError::write(table, "Table 'snake_db.missing' doesn't exist"));
        }
        self.appended
            .entry(table.to_string())
            .or_default()
            .push(batch.clone());
        Ok(batch.num_rows() as u64)
    }
}
