//! Error types for trueno-decode
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Every error maps onto a [`FailureKind`] so the region/contrast sweep can turn
//! it into a flagged row instead of aborting the remaining combinations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trueno-decode error types
#[derive(Error, Debug)]
pub enum Error {
    /// None of the requested categories occur in the label table
    #[error("Empty selection: categories {missing:?} not present in label table")]
    EmptySelection {
        /// Requested labels that never occur
        missing: Vec<String>,
    },

    /// Fewer than two distinct runs, so no fold has training data
    #[error("Insufficient runs: found {found} distinct run(s), need at least 2 for leave-one-run-out")]
    InsufficientRuns {
        /// Distinct runs present in the selection (or training split)
        found: usize,
    },

    /// Training split holds fewer than two classes
    #[error("Insufficient classes: training data holds {found} class(es), need at least 2")]
    InsufficientClasses {
        /// Distinct classes present in the training split
        found: usize,
    },

    /// Mask, label table or feature shapes disagree
    #[error("Shape mismatch ({context}): expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which pairing failed
        context: &'static str,
        /// Expected shape, rendered
        expected: String,
        /// Actual shape, rendered
        actual: String,
    },

    /// Decoder configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Label table source could not be interpreted
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Classifier used before fitting, or solver failure
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// CSV error (dataset label files)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error (configuration and reports)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`], stored on failed sweep rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Requested category absent
    EmptySelection,
    /// Not enough runs to cross-validate
    InsufficientRuns,
    /// Not enough classes in a training split
    InsufficientClasses,
    /// Incompatible shapes
    ShapeMismatch,
    /// Anything else (configuration, IO, solver)
    Other,
}

impl FailureKind {
    /// Stable short name used in tables and Arrow exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptySelection => "EmptySelection",
            Self::InsufficientRuns => "InsufficientRuns",
            Self::InsufficientClasses => "InsufficientClasses",
            Self::ShapeMismatch => "ShapeMismatch",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error for per-row reporting.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::EmptySelection { .. } => FailureKind::EmptySelection,
            Self::InsufficientRuns { .. } => FailureKind::InsufficientRuns,
            Self::InsufficientClasses { .. } => FailureKind::InsufficientClasses,
            Self::ShapeMismatch { .. } => FailureKind::ShapeMismatch,
            _ => FailureKind::Other,
        }
    }

    pub(crate) fn shape(
        context: &'static str,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        Self::ShapeMismatch {
            context,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}
