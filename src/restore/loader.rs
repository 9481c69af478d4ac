// parquetrestore/src/restore/loader.rs
use arrow::record_batch::RecordBatch;
use futures::{StreamExt, TryStreamExt, stream};
use std::collections::HashMap;
use tracing::info;

use super::decode::{decode_parquet, merge_batches, rename_columns};
use crate::errors::{RestoreError, Result};
use crate::sink::TableSink;
use crate::storage::{ObjectEntry, ObjectStore};

/// Column whose name collides with the destination schema, and its replacement.
pub const RESERVED_COLUMN: (&str, &str) = ("content_type", "content_type_dr_import");

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Files fetched and decoded at once within a chunk. Results are still
    /// concatenated in input order.
    pub fetch_concurrency: usize,
    pub column_renames: HashMap<String, String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        let (from, to) = RESERVED_COLUMN;
        LoadOptions {
            fetch_concurrency: 1,
            column_renames: HashMap::from([(from.to_string(), to.to_string())]),
        }
    }
}

/// Fetches and decodes `files`, concatenates them in order, applies the
/// column renames and appends the result to `table`.
///
/// Returns the appended batch. An empty file list appends nothing and yields
/// an empty batch without columns.
pub async fn load_table_files(
    table: &str,
    sink: &mut dyn TableSink,
    store: &dyn ObjectStore,
    bucket: &str,
    files: &[ObjectEntry],
    options: &LoadOptions,
) -> Result<RecordBatch> {
    let batches: Vec<RecordBatch> = stream::iter(files)
        .map(|file| fetch_and_decode(store, bucket, file))
        .buffered(options.fetch_concurrency.max(1))
        .try_collect()
        .await?;

    let merged = merge_batches(&batches).map_err(|source| RestoreError::Merge {
        table: table.to_string(),
        source,
    })?;
    let frame = rename_columns(merged, &options.column_renames).map_err(|source| RestoreError::Merge {
        table: table.to_string(),
        source,
    })?;

    if frame.num_rows() > 0 {
        sink.append(table, &frame).await?;
    }

    Ok(frame)
}

async fn fetch_and_decode(store: &dyn ObjectStore, bucket: &str, file: &ObjectEntry) -> Result<RecordBatch> {
    info!("Loading file: {}", file.key);
    let body = store.get_object(bucket, &file.key).await?;
    let batch = decode_parquet(&file.key, body)?;
    info!("Loaded file: {}, rows: {}", file.key, batch.num_rows());
    Ok(batch)
}
