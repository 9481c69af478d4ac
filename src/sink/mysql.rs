// parquetrestore/src/sink/mysql.rs
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Fields, Float16Type, Float32Type, Float64Type, Int8Type,
    Int16Type, Int32Type, Int64Type, Time32MillisecondType, Time32SecondType,
    Time64MicrosecondType, Time64NanosecondType, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlConnection};
use sqlx::query_builder::Separated;
use sqlx::{Connection, QueryBuilder};
use std::ops::Range;
use tracing::{debug, info};

use super::TableSink;
use crate::config::DestinationConfig;
use crate::errors::{RestoreError, Result};

/// MySQL refuses prepared statements with more placeholders than this.
const MAX_PLACEHOLDERS: usize = 65_535;

/// One cell converted to a type the MySQL driver can bind.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

/// Destination connection, opened once per run and reused for every table.
pub struct MySqlSink {
    conn: MySqlConnection,
    insert_batch_rows: usize,
}

impl MySqlSink {
    pub async fn connect(destination: &DestinationConfig, insert_batch_rows: usize) -> Result<Self> {
        let options = destination.connect_options()?;
        info!("Connecting to {}", destination.redacted());

        let mut conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(RestoreError::Connect)?;
        conn.ping().await.map_err(RestoreError::Connect)?;
        info!("✓ Connected to destination database");

        Ok(MySqlSink {
            conn,
            insert_batch_rows: insert_batch_rows.max(1),
        })
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(RestoreError::Connect)
    }
}

#[async_trait]
impl TableSink for MySqlSink {
    async fn append(&mut self, table: &str, batch: &RecordBatch) -> Result<u64> {
        if batch.num_rows() == 0 {
            return Ok(0);
        }
        if batch.num_columns() == 0 {
            return Err(RestoreError::write(table, "batch has rows but no columns"));
        }

        let prefix = insert_prefix(table, batch.schema().fields());
        let step = rows_per_statement(batch.num_columns(), self.insert_batch_rows);

        // One transaction per append: a failed chunk leaves nothing behind,
        // earlier chunks of the same table stay committed.
        let mut tx = self.conn.begin().await.map_err(|e| RestoreError::write(table, e))?;
        let mut written = 0u64;
        let mut start = 0;

        while start < batch.num_rows() {
            let end = (start + step).min(batch.num_rows());
            let rows = encode_rows(batch, start..end).map_err(|e| RestoreError::write(table, e))?;

            let mut builder = build_insert(&prefix, rows);
            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| RestoreError::write(table, e))?;
            written += result.rows_affected();
            debug!(table, rows = end - start, "INSERT statement executed");
            start = end;
        }

        tx.commit().await.map_err(|e| RestoreError::write(table, e))?;
        Ok(written)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn insert_prefix(table: &str, fields: &Fields) -> String {
    let columns: Vec<String> = fields.iter().map(|f| quote_identifier(f.name())).collect();
    format!(
        "INSERT INTO {} ({}) ",
        quote_identifier(table),
        columns.join(", ")
    )
}

/// Rows per INSERT so that a statement never exceeds the placeholder limit.
fn rows_per_statement(columns: usize, insert_batch_rows: usize) -> usize {
    insert_batch_rows
        .min(MAX_PLACEHOLDERS / columns.max(1))
        .max(1)
}

fn build_insert(prefix: &str, rows: Vec<Vec<SqlValue>>) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(prefix);
    builder.push_values(rows, |mut separated, values| {
        for value in values {
            push_value(&mut separated, value);
        }
    });
    builder
}

fn push_value(separated: &mut Separated<'_, '_, MySql, &'static str>, value: SqlValue) {
    match value {
        SqlValue::Null => separated.push_bind(None::<String>),
        SqlValue::Bool(v) => separated.push_bind(v),
        SqlValue::Int(v) => separated.push_bind(v),
        SqlValue::UInt(v) => separated.push_bind(v),
        SqlValue::Float(v) => separated.push_bind(v),
        SqlValue::Text(v) => separated.push_bind(v),
        SqlValue::Bytes(v) => separated.push_bind(v),
        SqlValue::Date(v) => separated.push_bind(v),
        SqlValue::Time(v) => separated.push_bind(v),
        SqlValue::DateTime(v) => separated.push_bind(v),
    };
}

fn encode_rows(batch: &RecordBatch, rows: Range<usize>) -> std::result::Result<Vec<Vec<SqlValue>>, ArrowError> {
    rows.map(|row| {
        batch
            .columns()
            .iter()
            .map(|column| cell_value(column, row))
            .collect::<std::result::Result<Vec<_>, _>>()
    })
    .collect()
}

/// Converts one Arrow cell. Types without a native MySQL binding (decimals,
/// lists, intervals...) are sent as their display text and cast by the server.
pub fn cell_value(column: &ArrayRef, row: usize) -> std::result::Result<SqlValue, ArrowError> {
    if column.is_null(row) {
        return Ok(SqlValue::Null);
    }

    let out_of_range = || {
        ArrowError::CastError(format!(
            "{} value at row {} is out of range",
            column.data_type(),
            row
        ))
    };

    let value = match column.data_type() {
        DataType::Null => SqlValue::Null,
        DataType::Boolean => SqlValue::Bool(column.as_boolean().value(row)),
        DataType::Int8 => SqlValue::Int(column.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => SqlValue::Int(column.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => SqlValue::Int(column.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => SqlValue::Int(column.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => SqlValue::UInt(column.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => SqlValue::UInt(column.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => SqlValue::UInt(column.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => SqlValue::UInt(column.as_primitive::<UInt64Type>().value(row)),
        DataType::Float16 => SqlValue::Float(column.as_primitive::<Float16Type>().value(row).to_f64()),
        DataType::Float32 => SqlValue::Float(column.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => SqlValue::Float(column.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => SqlValue::Text(column.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => SqlValue::Text(column.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => SqlValue::Text(column.as_string_view().value(row).to_string()),
        DataType::Binary => SqlValue::Bytes(column.as_binary::<i32>().value(row).to_vec()),
        DataType::LargeBinary => SqlValue::Bytes(column.as_binary::<i64>().value(row).to_vec()),
        DataType::BinaryView => SqlValue::Bytes(column.as_binary_view().value(row).to_vec()),
        DataType::FixedSizeBinary(_) => {
            SqlValue::Bytes(column.as_fixed_size_binary().value(row).to_vec())
        }
        DataType::Date32 => SqlValue::Date(
            column
                .as_primitive::<Date32Type>()
                .value_as_date(row)
                .ok_or_else(out_of_range)?,
        ),
        DataType::Date64 => SqlValue::Date(
            column
                .as_primitive::<Date64Type>()
                .value_as_date(row)
                .ok_or_else(out_of_range)?,
        ),
        DataType::Time32(TimeUnit::Second) => SqlValue::Time(
            column
                .as_primitive::<Time32SecondType>()
                .value_as_time(row)
                .ok_or_else(out_of_range)?,
        ),
        DataType::Time32(TimeUnit::Millisecond) => SqlValue::Time(
            column
                .as_primitive::<Time32MillisecondType>()
                .value_as_time(row)
                .ok_or_else(out_of_range)?,
        ),
        DataType::Time64(TimeUnit::Microsecond) => SqlValue::Time(
            column
                .as_primitive::<Time64MicrosecondType>()
                .value_as_time(row)
                .ok_or_else(out_of_range)?,
        ),
        DataType::Time64(TimeUnit::Nanosecond) => SqlValue::Time(
            column
                .as_primitive::<Time64NanosecondType>()
                .value_as_time(row)
                .ok_or_else(out_of_range)?,
        ),
        // DATETIME has no zone; instants are written as naive UTC.
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => column.as_primitive::<TimestampSecondType>().value_as_datetime(row),
                TimeUnit::Millisecond => {
                    column.as_primitive::<TimestampMillisecondType>().value_as_datetime(row)
                }
                TimeUnit::Microsecond => {
                    column.as_primitive::<TimestampMicrosecondType>().value_as_datetime(row)
                }
                TimeUnit::Nanosecond => {
                    column.as_primitive::<TimestampNanosecondType>().value_as_datetime(row)
                }
            };
            SqlValue::DateTime(datetime.ok_or_else(out_of_range)?)
        }
        _ => SqlValue::Text(array_value_to_string(column.as_ref(), row)?),
    };
    Ok(value)
}
