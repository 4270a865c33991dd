//! In-memory dataset construction and CSV staging.
//!
//! The dataset is an Arrow [`RecordBatch`] with a fixed four-column schema
//! `(id: Int64, name: Utf8, value: Int64, date: Date32)`. This module builds
//! the sample batch, compares batches independent of row order, and moves a
//! batch through a local CSV staging file.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::compute::{concat_batches, sort_to_indices, take};
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow_array::{Date32Array, Int64Array, StringArray};
use chrono::{Duration, NaiveDate};

use crate::err;
use crate::error::Result;

/// Column the order-insensitive comparison keys rows by.
const ID_COLUMN: &str = "id";

/// The fixed schema shared by every copy of the dataset in this pipeline.
pub fn dataset_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("value", DataType::Int64, false),
        Field::new("date", DataType::Date32, false),
    ]))
}

/// Builds the fixed five-row sample dataset.
///
/// # Returns
/// A `RecordBatch` with ids 1..5, names Alice..Eve, values 100..500 in steps
/// of 100, and dates 2024-01-01..2024-01-05.
pub fn sample_dataset() -> Result<RecordBatch> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or_else(|| err!("invalid start date"))?;
    let dates: Vec<i32> = (0..5)
        .map(|offset| days_since_epoch(start + Duration::days(offset)))
        .collect();

    let batch = RecordBatch::try_new(
        dataset_schema(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5])),
            Arc::new(StringArray::from(vec![
                "Alice", "Bob", "Charlie", "David", "Eve",
            ])),
            Arc::new(Int64Array::from(vec![100, 200, 300, 400, 500])),
            Arc::new(Date32Array::from(dates)),
        ],
    )?;
    Ok(batch)
}

/// Returns the (rows, columns) shape of a batch.
pub fn shape(batch: &RecordBatch) -> (usize, usize) {
    (batch.num_rows(), batch.num_columns())
}

/// Number of days between the Unix epoch and the given date, the unit a
/// `Date32` column stores.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

/// Inverse of [`days_since_epoch`].
pub fn date_from_days(days: i32) -> NaiveDate {
    NaiveDate::default() + Duration::days(days as i64)
}

/// Compares two datasets independent of row order.
///
/// Both batches are sorted by their `id` column before comparison, so a
/// store that returns rows in a different order still compares equal. The
/// schemas must match exactly.
pub fn datasets_match(left: &RecordBatch, right: &RecordBatch) -> Result<bool> {
    if left.schema() != right.schema() || left.num_rows() != right.num_rows() {
        return Ok(false);
    }
    Ok(sort_by_id(left)? == sort_by_id(right)?)
}

fn sort_by_id(batch: &RecordBatch) -> Result<RecordBatch> {
    let id_index = batch.schema().index_of(ID_COLUMN)?;
    let indices = sort_to_indices(batch.column(id_index), None, None)?;
    let columns = batch
        .columns()
        .iter()
        .map(|column| take(column.as_ref(), &indices, None))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(RecordBatch::try_new(batch.schema(), columns)?)
}

/// Serializes a batch to a headered CSV file, creating the parent directory
/// if it does not exist.
pub fn write_csv(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    Ok(())
}

/// Parses headered CSV bytes back into a batch using the given schema.
///
/// The caller owns the byte source; this is used both for the local staging
/// file and for bytes downloaded from the object store. Input larger than
/// the reader's internal batch size is concatenated into one batch.
pub fn read_csv<R: Read>(reader: R, schema: SchemaRef) -> Result<RecordBatch> {
    let csv = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(reader)?;
    let batches = csv.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

#[cfg(test)]
mod test {
    use std::fs::File;
    use std::sync::Arc;

    use arrow::record_batch::RecordBatch;
    use arrow_array::{Date32Array, Int64Array, StringArray};
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn sample_dataset_has_expected_shape_and_values() {
        let batch = sample_dataset().unwrap();
        assert_eq!(shape(&batch), (5, 4));

        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(&ids.values()[..], &[1, 2, 3, 4, 5]);

        let names = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        let expected_names = ["Alice", "Bob", "Charlie", "David", "Eve"];
        for (i, expected) in expected_names.iter().enumerate() {
            assert_eq!(&names.value(i), expected);
        }

        let values = batch
            .column(2)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(&values.values()[..], &[100, 200, 300, 400, 500]);

        let dates = batch
            .column(3)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        for i in 0..5 {
            let expected = NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap();
            assert_eq!(date_from_days(dates.value(i)), expected);
        }
    }

    #[test]
    fn day_conversion_round_trips() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date_from_days(days_since_epoch(date)), date);
        assert_eq!(days_since_epoch(NaiveDate::default()), 0);
    }

    #[test]
    fn reordered_dataset_matches() {
        let batch = sample_dataset().unwrap();
        let reversed = RecordBatch::try_new(
            dataset_schema(),
            vec![
                Arc::new(Int64Array::from(vec![5, 4, 3, 2, 1])),
                Arc::new(StringArray::from(vec![
                    "Eve", "David", "Charlie", "Bob", "Alice",
                ])),
                Arc::new(Int64Array::from(vec![500, 400, 300, 200, 100])),
                Arc::new(Date32Array::from(
                    (0u32..5)
                        .rev()
                        .map(|offset| {
                            days_since_epoch(
                                NaiveDate::from_ymd_opt(2024, 1, 1 + offset).unwrap(),
                            )
                        })
                        .collect::<Vec<_>>(),
                )),
            ],
        )
        .unwrap();
        assert!(datasets_match(&batch, &reversed).unwrap());
    }

    #[test]
    fn changed_value_does_not_match() {
        let batch = sample_dataset().unwrap();
        let changed = RecordBatch::try_new(
            dataset_schema(),
            vec![
                batch.column(0).clone(),
                batch.column(1).clone(),
                Arc::new(Int64Array::from(vec![100, 200, 300, 400, 501])),
                batch.column(3).clone(),
            ],
        )
        .unwrap();
        assert!(!datasets_match(&batch, &changed).unwrap());
    }

    #[test]
    fn csv_round_trip_restores_dataset() {
        let batch = sample_dataset().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staging").join("example_data.csv");

        write_csv(&path, &batch).unwrap();
        let restored = read_csv(File::open(&path).unwrap(), dataset_schema()).unwrap();

        assert_eq!(shape(&restored), (5, 4));
        assert_eq!(batch, restored);
    }

    #[test]
    fn read_csv_of_header_only_input_is_empty() {
        let restored = read_csv("id,name,value,date\n".as_bytes(), dataset_schema()).unwrap();
        assert_eq!(shape(&restored), (0, 4));
    }

    #[test]
    fn read_csv_keeps_rows_beyond_one_reader_batch() {
        let mut csv_text = String::from("id,name,value,date\n");
        for i in 0..2500i64 {
            csv_text.push_str(&format!("{},row{},{},2024-01-01\n", i, i, i * 10));
        }

        let restored = read_csv(csv_text.as_bytes(), dataset_schema()).unwrap();
        assert_eq!(shape(&restored), (2500, 4));

        let ids = restored
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.value(0), 0);
        assert_eq!(ids.value(2499), 2499);
    }
}
