//! Sweep results: rows, text rendering, Arrow export and JSON reports

use crate::config::DecoderConfig;
use crate::error::FailureKind;
use crate::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Outcome flag of one combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RowStatus {
    /// Aggregate accuracy defined
    Ok,
    /// Combination could not be evaluated
    Failed {
        /// Failure class
        kind: FailureKind,
        /// Human-readable reason
        reason: String,
    },
}

/// One (contrast, region) result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    /// Contrast name
    pub contrast: String,
    /// Region name
    pub region: String,
    /// Mean accuracy on the 0-100 scale; `None` when failed
    pub accuracy_pct: Option<f64>,
    /// Standard deviation of fold accuracies on the 0-100 scale
    pub std_pct: Option<f64>,
    /// Chance level on the 0-1 scale; `None` for a contrast without categories
    pub chance_level: Option<f64>,
    /// Folds that contributed
    pub folds_used: usize,
    /// Folds excluded
    pub folds_skipped: usize,
    /// Success or failure reason
    pub status: RowStatus,
}

impl SweepRow {
    /// Row for a combination that raised `err`.
    #[must_use]
    pub fn failed(contrast: &str, region: &str, chance_level: Option<f64>, err: &Error) -> Self {
        Self {
            contrast: contrast.to_string(),
            region: region.to_string(),
            accuracy_pct: None,
            std_pct: None,
            chance_level,
            folds_used: 0,
            folds_skipped: 0,
            status: RowStatus::Failed {
                kind: err.kind(),
                reason: err.to_string(),
            },
        }
    }

    /// True if the accuracy is defined.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, RowStatus::Ok)
    }
}

/// Ordered sweep rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    rows: Vec<SweepRow>,
}

impl ResultsTable {
    /// Wrap rows.
    #[must_use]
    pub fn new(rows: Vec<SweepRow>) -> Self {
        Self { rows }
    }

    /// All rows in sweep order.
    #[must_use]
    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a (contrast, region) pair.
    #[must_use]
    pub fn get(&self, contrast: &str, region: &str) -> Option<&SweepRow> {
        self.rows
            .iter()
            .find(|r| r.contrast == contrast && r.region == region)
    }

    /// Rows with a defined accuracy.
    pub fn succeeded(&self) -> impl Iterator<Item = &SweepRow> {
        self.rows.iter().filter(|r| r.is_ok())
    }

    /// Flagged rows.
    pub fn failed(&self) -> impl Iterator<Item = &SweepRow> {
        self.rows.iter().filter(|r| !r.is_ok())
    }

    /// Arrow schema of [`to_record_batch`](Self::to_record_batch).
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new("contrast", DataType::Utf8, false),
            Field::new("region", DataType::Utf8, false),
            Field::new("accuracy_pct", DataType::Float64, true),
            Field::new("chance_level", DataType::Float64, true),
            Field::new("folds_used", DataType::UInt64, false),
            Field::new("status", DataType::Utf8, false),
            Field::new("reason", DataType::Utf8, true),
        ])
    }

    /// Export rows as an Arrow record batch for plotting collaborators.
    ///
    /// # Errors
    /// Returns error if Arrow rejects the batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let contrast = StringArray::from_iter_values(self.rows.iter().map(|r| r.contrast.as_str()));
        let region = StringArray::from_iter_values(self.rows.iter().map(|r| r.region.as_str()));
        let accuracy: Float64Array = self.rows.iter().map(|r| r.accuracy_pct).collect();
        let chance: Float64Array = self.rows.iter().map(|r| r.chance_level).collect();
        let folds = UInt64Array::from_iter_values(self.rows.iter().map(|r| r.folds_used as u64));
        let status = StringArray::from_iter_values(self.rows.iter().map(|r| match &r.status {
            RowStatus::Ok => "ok",
            RowStatus::Failed { kind, .. } => kind.as_str(),
        }));
        let reason: StringArray = self
            .rows
            .iter()
            .map(|r| match &r.status {
                RowStatus::Ok => None,
                RowStatus::Failed { reason, .. } => Some(reason.as_str()),
            })
            .collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(contrast),
            Arc::new(region),
            Arc::new(accuracy),
            Arc::new(chance),
            Arc::new(folds),
            Arc::new(status),
            Arc::new(reason),
        ];
        Ok(RecordBatch::try_new(Arc::new(Self::schema()), columns)?)
    }
}

impl fmt::Display for ResultsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cw = self
            .rows
            .iter()
            .map(|r| r.contrast.len())
            .chain(std::iter::once("contrast".len()))
            .max()
            .unwrap_or(0);
        let rw = self
            .rows
            .iter()
            .map(|r| r.region.len())
            .chain(std::iter::once("region".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:<cw$}  {:<rw$}  {:>8}  {:>6}  status",
            "contrast", "region", "accuracy", "chance"
        )?;
        for row in &self.rows {
            let accuracy = row
                .accuracy_pct
                .map_or_else(|| "-".to_string(), |a| format!("{a:.1}%"));
            let chance = row
                .chance_level
                .map_or_else(|| "-".to_string(), |c| format!("{c:.2}"));
            let status = match &row.status {
                RowStatus::Ok => "ok".to_string(),
                RowStatus::Failed { kind, reason } => format!("FAILED {kind}: {reason}"),
            };
            writeln!(
                f,
                "{:<cw$}  {:<rw$}  {:>8}  {:>6}  {}",
                row.contrast, row.region, accuracy, chance, status
            )?;
        }
        Ok(())
    }
}

/// Sweep results with the configuration that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Report creation time
    pub generated_at: DateTime<Utc>,
    /// Decoder configuration used
    pub config: DecoderConfig,
    /// Result rows
    pub table: ResultsTable,
}

impl SweepReport {
    /// Stamp a results table with the current time.
    #[must_use]
    pub fn new(config: DecoderConfig, table: ResultsTable) -> Self {
        Self {
            generated_at: Utc::now(),
            config,
            table,
        }
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    /// Returns error on malformed JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
