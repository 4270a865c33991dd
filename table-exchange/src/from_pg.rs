//! Conversion from PostgreSQL rows back into Arrow record batches.
//!
//! Inverse of [`crate::to_pg`]: the read path selects rows with
//! `tokio_postgres` and rebuilds typed Arrow arrays column by column against
//! the expected schema.

use std::sync::Arc;

use arrow::datatypes::{DataType, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow_array::{
    ArrayRef,
    BooleanArray,
    Date32Array,
    Float64Array,
    Int32Array,
    Int64Array,
    StringArray,
    TimestampMicrosecondArray,
};
use chrono::{NaiveDate, NaiveDateTime};
use tokio_postgres::Row;

use crate::dataset::days_since_epoch;
use crate::err;
use crate::error::Result;

/// Rebuilds a `RecordBatch` from query rows.
///
/// Columns are extracted positionally, so the SELECT that produced the rows
/// must list columns in the schema's field order. Cell extraction follows the
/// column's Arrow type; a type the pipeline does not carry is an error.
pub fn rows_to_batch(rows: &[Row], schema: SchemaRef) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for (i, field) in schema.fields().iter().enumerate() {
        let column: ArrayRef = match field.data_type() {
            DataType::Boolean => Arc::new(
                rows.iter()
                    .map(|row| row.get::<_, Option<bool>>(i))
                    .collect::<BooleanArray>(),
            ),
            DataType::Int32 => Arc::new(
                rows.iter()
                    .map(|row| row.get::<_, Option<i32>>(i))
                    .collect::<Int32Array>(),
            ),
            DataType::Int64 => Arc::new(
                rows.iter()
                    .map(|row| row.get::<_, Option<i64>>(i))
                    .collect::<Int64Array>(),
            ),
            DataType::Float64 => Arc::new(
                rows.iter()
                    .map(|row| row.get::<_, Option<f64>>(i))
                    .collect::<Float64Array>(),
            ),
            DataType::Utf8 => Arc::new(
                rows.iter()
                    .map(|row| row.get::<_, Option<String>>(i))
                    .collect::<StringArray>(),
            ),
            DataType::Date32 => Arc::new(
                rows.iter()
                    .map(|row| row.get::<_, Option<NaiveDate>>(i).map(days_since_epoch))
                    .collect::<Date32Array>(),
            ),
            DataType::Timestamp(TimeUnit::Microsecond, None) => Arc::new(
                rows.iter()
                    .map(|row| {
                        row.get::<_, Option<NaiveDateTime>>(i)
                            .map(|ts| ts.and_utc().timestamp_micros())
                    })
                    .collect::<TimestampMicrosecondArray>(),
            ),
            other => return Err(err!("Unsupported column type", other)),
        };
        columns.push(column);
    }

    Ok(RecordBatch::try_new(schema, columns)?)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use arrow::datatypes::{DataType, Field, Schema};
    use arrow_array::Array;

    use super::*;
    use crate::dataset::dataset_schema;

    #[test]
    fn empty_rows_build_an_empty_batch() {
        let batch = rows_to_batch(&[], dataset_schema()).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 4);
    }

    #[test]
    fn wider_schema_builds_typed_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("active", DataType::Boolean, true),
            Field::new("count", DataType::Int32, true),
            Field::new("ratio", DataType::Float64, true),
            Field::new(
                "seen_at",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                true,
            ),
        ]));

        let batch = rows_to_batch(&[], schema.clone()).unwrap();
        assert_eq!(batch.num_rows(), 0);
        for (column, field) in batch.columns().iter().zip(schema.fields()) {
            assert_eq!(column.data_type(), field.data_type());
        }
    }

    #[test]
    fn unsupported_column_type_is_rejected() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "blob",
            DataType::Binary,
            true,
        )]));
        assert!(rows_to_batch(&[], schema).is_err());
    }
}
