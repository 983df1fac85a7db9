//! Label table sources (Arrow, Parquet, dataset text files)
//!
//! The Haxby dataset ships its labels as a space separated text file with a
//! `labels chunks` header, where `chunks` is the run identifier. Arrow and
//! Parquet sources accept either naming (`labels`/`label`, `chunks`/`run`).

use super::{LabelTable, TrialLabel};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Int32Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Accepted names for the category column, in lookup order.
pub const LABEL_COLUMN_NAMES: [&str; 2] = ["labels", "label"];

/// Accepted names for the run column, in lookup order.
pub const RUN_COLUMN_NAMES: [&str; 2] = ["chunks", "run"];

#[derive(Debug, Deserialize)]
struct TextRow {
    #[serde(alias = "label")]
    labels: String,
    #[serde(alias = "run")]
    chunks: i64,
}

impl LabelTable {
    /// Build a table from one Arrow record batch.
    ///
    /// # Errors
    /// Returns error if the label or run column is missing, has an
    /// unsupported type, or contains nulls
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let label_col = find_column(batch, &LABEL_COLUMN_NAMES)?;
        let run_col = find_column(batch, &RUN_COLUMN_NAMES)?;

        let labels = label_col
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                Error::StorageError(format!(
                    "Label column must be Utf8, got {:?}",
                    label_col.data_type()
                ))
            })?;
        let runs = run_values(run_col)?;

        let mut records = Vec::with_capacity(batch.num_rows());
        for (row, run) in runs.into_iter().enumerate() {
            if labels.is_null(row) {
                return Err(Error::StorageError(format!("Null label at row {row}")));
            }
            records.push(TrialLabel::new(labels.value(row), run));
        }

        Ok(Self { records })
    }

    /// Build a table from consecutive Arrow record batches.
    ///
    /// # Errors
    /// Returns error if any batch fails [`from_record_batch`](Self::from_record_batch)
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let mut records = Vec::new();
        for batch in batches {
            records.extend(Self::from_record_batch(batch)?.records);
        }
        Ok(Self { records })
    }

    /// Load a table from a Parquet file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
        use std::fs::File;

        let file = File::open(path.as_ref()).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file: {e}"))
        })?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }

        let table = Self::from_batches(&batches)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            frames = table.len(),
            "loaded label table from parquet"
        );
        Ok(table)
    }

    /// Read a delimited text table with a `labels chunks` header.
    ///
    /// # Errors
    /// Returns error on malformed rows or a non-integer run value
    pub fn from_delimited_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in reader.deserialize::<TextRow>() {
            let row = row?;
            records.push(TrialLabel::new(row.labels, row.chunks));
        }
        Ok(Self { records })
    }

    /// Load the dataset's space separated label file.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or parsed
    pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_delimited_reader(file, b' ')?;
        tracing::debug!(
            path = %path.as_ref().display(),
            frames = table.len(),
            "loaded label table from text"
        );
        Ok(table)
    }
}

fn find_column<'a>(batch: &'a RecordBatch, names: &[&str]) -> Result<&'a ArrayRef> {
    let schema = batch.schema();
    names
        .iter()
        .find_map(|name| schema.index_of(name).ok())
        .map(|idx| batch.column(idx))
        .ok_or_else(|| {
            Error::StorageError(format!("Missing column: expected one of {names:?}"))
        })
}

fn run_values(column: &ArrayRef) -> Result<Vec<i64>> {
    if column.null_count() > 0 {
        return Err(Error::StorageError(format!(
            "Run column contains {} null(s)",
            column.null_count()
        )));
    }

    if let Some(array) = column.as_any().downcast_ref::<Int64Array>() {
        return Ok(array.values().to_vec());
    }
    if let Some(array) = column.as_any().downcast_ref::<Int32Array>() {
        return Ok(array.values().iter().map(|&v| i64::from(v)).collect());
    }

    Err(Error::StorageError(format!(
        "Run column must be Int32 or Int64, got {:?}",
        column.data_type()
    )))
}
