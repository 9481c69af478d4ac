// parquetrestore/src/restore/decode.rs
use arrow::array::new_null_array;
use arrow::compute::concat_batches;
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{RestoreError, Result};

/// Decodes a whole parquet object into a single batch.
pub fn decode_parquet(key: &str, body: Bytes) -> Result<RecordBatch> {
    let decode_error = |source: Box<dyn std::error::Error + Send + Sync>| RestoreError::Decode {
        key: key.to_string(),
        source,
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(body).map_err(|e| decode_error(e.into()))?;
    let schema = builder.schema().clone();
    let reader = builder.build().map_err(|e| decode_error(e.into()))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, ArrowError>>()
        .map_err(|e| decode_error(e.into()))?;

    concat_batches(&schema, &batches).map_err(|e| decode_error(e.into()))
}

/// Concatenates per-file batches in order. Columns are the union of all files
/// in order of first appearance; a file lacking a column contributes nulls.
/// No batches yields an empty batch with no columns.
pub fn merge_batches(batches: &[RecordBatch]) -> std::result::Result<RecordBatch, ArrowError> {
    let Some(first) = batches.first() else {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    };
    if batches.len() == 1 {
        return Ok(first.clone());
    }

    let mut fields: Vec<Field> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (file_no, batch) in batches.iter().enumerate() {
        for field in batch.schema().fields() {
            match positions.get(field.name()) {
                Some(&position) => {
                    let known = &mut fields[position];
                    if known.data_type() != field.data_type() {
                        return Err(ArrowError::SchemaError(format!(
                            "column '{}' is {} in file #{}, expected {}",
                            field.name(),
                            field.data_type(),
                            file_no + 1,
                            known.data_type()
                        )));
                    }
                    if field.is_nullable() {
                        known.set_nullable(true);
                    }
                }
                None => {
                    positions.insert(field.name().clone(), fields.len());
                    fields.push(field.as_ref().clone());
                }
            }
        }
    }
    for field in fields.iter_mut() {
        if batches.iter().any(|b| b.column_by_name(field.name()).is_none()) {
            field.set_nullable(true);
        }
    }

    let merged_schema = Arc::new(Schema::new_with_metadata(fields, first.schema().metadata().clone()));
    let aligned = batches
        .iter()
        .map(|batch| align_to(batch, &merged_schema))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    concat_batches(&merged_schema, &aligned)
}

fn align_to(batch: &RecordBatch, schema: &SchemaRef) -> std::result::Result<RecordBatch, ArrowError> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| match batch.column_by_name(field.name()) {
            Some(column) => column.clone(),
            None => new_null_array(field.data_type(), batch.num_rows()),
        })
        .collect();
    RecordBatch::try_new_with_options(
        schema.clone(),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(batch.num_rows())),
    )
}

/// Renames columns found in `renames`; other columns are left untouched.
pub fn rename_columns(
    batch: RecordBatch,
    renames: &HashMap<String, String>,
) -> std::result::Result<RecordBatch, ArrowError> {
    let schema = batch.schema();
    if !schema.fields().iter().any(|f| renames.contains_key(f.name())) {
        return Ok(batch);
    }

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| match renames.get(field.name()) {
            Some(new_name) => field.as_ref().clone().with_name(new_name.as_str()),
            None => field.as_ref().clone(),
        })
        .collect();
    let renamed = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));

    RecordBatch::try_new_with_options(
        renamed,
        batch.columns().to_vec(),
        &RecordBatchOptions::new().with_row_count(Some(batch.num_rows())),
    )
}

fn column_names(schema: &Schema) -> Vec<&str> {
    schema.fields().iter().map(|f| f.name().as_str()).collect()
}
