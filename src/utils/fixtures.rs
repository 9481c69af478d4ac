// parquetrestore/src/utils/fixtures.rs
//! Parquet fixtures shared by the unit tests.
use anyhow::Result;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use std::sync::Arc;

/// A `snakes` table batch with `id` and `name` columns.
pub fn snakes_batch(ids: &[i64], names: &[&str]) -> RecordBatch {
    RecordBatch::try_from_iter(vec![
        ("id", Arc::new(Int64Array::from(ids.to_vec())) as ArrayRef),
        ("name", Arc::new(StringArray::from(names.to_vec())) as ArrayRef),
    ])
    .expect("fixture batch is well formed")
}

/// Rows `start..start + count` of the `snakes` table.
pub fn snakes_range(start: i64, count: i64) -> RecordBatch {
    let ids: Vec<i64> = (start..start + count).collect();
    let names: Vec<String> = ids.iter().map(|id| format!("snake-{}", id)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    snakes_batch(&ids, &names)
}

pub fn parquet_file(batch: &RecordBatch) -> Result<Bytes> {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(Bytes::from(buffer))
}

pub fn ids_of(batch: &RecordBatch) -> Vec<i64> {
    batch
        .column_by_name("id")
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .map(|ids| ids.values().to_vec())
        .unwrap_or_default()
}
