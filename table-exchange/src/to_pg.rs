//! Conversion from Arrow record batches to PostgreSQL parameters.
//!
//! The key types are `PgValue` and `PgColumn`, which map Arrow types to
//! PostgreSQL column types and values, enabling multi-row inserts from an
//! Arrow `RecordBatch`. The conversion covers the types this pipeline's DDL
//! mapping can produce: Boolean, Int32, Int64, Float64, Utf8, Date32, and
//! microsecond timestamps.

use std::error::Error;

use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow_array::{
    Array,
    BooleanArray,
    Date32Array,
    Float64Array,
    Int32Array,
    Int64Array,
    StringArray,
    TimestampMicrosecondArray,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tokio_postgres::types::private::BytesMut;
use tokio_postgres::types::{IsNull, ToSql, Type as PostgresType};

use crate::dataset::date_from_days;
use crate::err;
use crate::error::Result;

/// `PgColumn` represents the metadata for a PostgreSQL column as reported by
/// `information_schema.columns`.
#[derive(Debug)]
pub struct PgColumn {
    /// The name of the column in the PostgreSQL table.
    pub column_name: String,

    /// The SQL data type of the column, such as `bigint` or `text`.
    pub data_type: String,

    /// Whether the column accepts NULL values.
    pub nullable: bool,
}

/// `PgValue` represents the data types this pipeline can pass as parameters
/// in PostgreSQL queries. Each variant corresponds to a specific data type
/// that PostgreSQL supports.
#[derive(Clone, Debug)]
pub enum PgValue {
    /// A `bool`, corresponding to PostgreSQL's `BOOLEAN` type.
    Boolean(bool),

    /// A 32-bit signed integer, corresponding to PostgreSQL's `INTEGER` type.
    Int32(i32),

    /// A 64-bit signed integer, corresponding to PostgreSQL's `BIGINT` type.
    Int64(i64),

    /// A 64-bit float, corresponding to PostgreSQL's `DOUBLE PRECISION` type.
    Float64(f64),

    /// A `String`, corresponding to PostgreSQL's `TEXT` or `VARCHAR` type.
    Text(String),

    /// A `NaiveDate`, corresponding to PostgreSQL's `DATE` type.
    Date(NaiveDate),

    /// A `NaiveDateTime`, corresponding to PostgreSQL's `TIMESTAMP` type.
    Timestamp(NaiveDateTime),

    /// A null value in a PG column.
    Null,
}

impl ToSql for PgValue {
    /// Converts the `PgValue` enum into a format suitable for PostgreSQL,
    /// writing the value to the provided `BytesMut` buffer.
    fn to_sql(
        &self,
        ty: &PostgresType,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            PgValue::Boolean(v) => v.to_sql(ty, out),
            PgValue::Int32(v) => v.to_sql(ty, out),
            PgValue::Int64(v) => v.to_sql(ty, out),
            PgValue::Float64(v) => v.to_sql(ty, out),
            PgValue::Text(v) => v.to_sql(ty, out),
            PgValue::Date(v) => v.to_sql(ty, out),
            PgValue::Timestamp(v) => v.to_sql(ty, out),
            PgValue::Null => Ok(IsNull::Yes),
        }
    }

    /// Indicates which PostgreSQL types this `PgValue` supports for conversion.
    fn accepts(ty: &PostgresType) -> bool {
        matches!(
            ty,
            &PostgresType::BOOL
                | &PostgresType::INT4
                | &PostgresType::INT8
                | &PostgresType::FLOAT8
                | &PostgresType::TEXT
                | &PostgresType::VARCHAR
                | &PostgresType::DATE
                | &PostgresType::TIMESTAMP
        )
    }

    fn to_sql_checked(
        &self,
        ty: &PostgresType,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.to_sql(ty, out)
    }
}

/// Converts one row of an Arrow `RecordBatch` into PostgreSQL parameters.
///
/// # Arguments
///
/// * `rb` - The `RecordBatch` containing Arrow arrays.
/// * `index` - The row index to extract values from.
///
/// # Returns
///
/// A `Vec<PgValue>` representing the row at the given index, one value per
/// column, with nulls mapped to `PgValue::Null`.
pub fn get_pg_values(rb: &RecordBatch, index: usize) -> Result<Vec<PgValue>> {
    let param_schema = rb.schema();
    rb.columns()
        .iter()
        .zip(param_schema.fields().iter())
        .map(|(col, field)| match field.data_type() {
            DataType::Boolean => {
                let src_col = col
                    .as_any()
                    .downcast_ref::<BooleanArray>()
                    .ok_or_else(|| err!("Types don't match"))?;
                if src_col.is_null(index) {
                    Ok(PgValue::Null)
                } else {
                    Ok(PgValue::Boolean(src_col.value(index)))
                }
            }
            DataType::Int32 => {
                let src_col = col
                    .as_any()
                    .downcast_ref::<Int32Array>()
                    .ok_or_else(|| err!("Types don't match"))?;
                if src_col.is_null(index) {
                    Ok(PgValue::Null)
                } else {
                    Ok(PgValue::Int32(src_col.value(index)))
                }
            }
            DataType::Int64 => {
                let src_col = col
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or_else(|| err!("Types don't match"))?;
                if src_col.is_null(index) {
                    Ok(PgValue::Null)
                } else {
                    Ok(PgValue::Int64(src_col.value(index)))
                }
            }
            DataType::Float64 => {
                let src_col = col
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| err!("Types don't match"))?;
                if src_col.is_null(index) {
                    Ok(PgValue::Null)
                } else {
                    Ok(PgValue::Float64(src_col.value(index)))
                }
            }
            DataType::Utf8 => {
                let src_col = col
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| err!("Types don't match"))?;
                if src_col.is_null(index) {
                    Ok(PgValue::Null)
                } else {
                    Ok(PgValue::Text(src_col.value(index).to_string()))
                }
            }
            DataType::Date32 => {
                let src_col = col
                    .as_any()
                    .downcast_ref::<Date32Array>()
                    .ok_or_else(|| err!("Types don't match"))?;
                if src_col.is_null(index) {
                    Ok(PgValue::Null)
                } else {
                    Ok(PgValue::Date(date_from_days(src_col.value(index))))
                }
            }
            DataType::Timestamp(TimeUnit::Microsecond, None) => {
                let src_col = col
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()
                    .ok_or_else(|| err!("Types don't match"))?;
                if src_col.is_null(index) {
                    Ok(PgValue::Null)
                } else {
                    let timestamp = DateTime::from_timestamp_micros(src_col.value(index))
                        .ok_or_else(|| err!("Invalid timestamp value"))?
                        .naive_utc();
                    Ok(PgValue::Timestamp(timestamp))
                }
            }
            other => Err(err!("Unsupported parameter type", other)),
        })
        .collect()
}
