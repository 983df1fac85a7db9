//! Fold outcomes and their aggregate
//!
//! The headline statistic is the arithmetic mean of the folds that produced a
//! score. Skipped folds are listed with a reason but never enter the mean; if
//! every fold was skipped the aggregate is undefined (`None`), never zero.

use crate::error::FailureKind;
use serde::{Deserialize, Serialize};

/// Expected accuracy of uniform guessing among `n_categories` classes.
///
/// Undefined (`None`) for zero categories.
///
/// ```rust
/// use trueno_decode::aggregate::chance_level;
///
/// assert_eq!(chance_level(2), Some(0.5));
/// assert_eq!(chance_level(0), None);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn chance_level(n_categories: usize) -> Option<f64> {
    (n_categories > 0).then(|| 1.0 / n_categories as f64)
}

/// What happened to one fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum FoldOutcome {
    /// Classifier fitted and the test fold was scored
    Scored {
        /// Score in [0, 1]
        score: f64,
    },
    /// No score; excluded from the aggregate
    Skipped {
        /// Failure class
        kind: FailureKind,
        /// Human-readable reason
        reason: String,
    },
}

/// Result of one train/test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldScore {
    /// Held-out run(s)
    pub test_runs: Vec<i64>,
    /// Training sample count
    pub n_train: usize,
    /// Test sample count
    pub n_test: usize,
    /// Predicted labels for the test samples (empty when skipped)
    pub predictions: Vec<String>,
    /// Score or skip reason
    pub outcome: FoldOutcome,
}

impl FoldScore {
    /// The fold's score, if it produced one.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        match self.outcome {
            FoldOutcome::Scored { score } => Some(score),
            FoldOutcome::Skipped { .. } => None,
        }
    }
}

/// Mean over contributing folds plus the chance reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    /// Mean fold score in [0, 1]; `None` when no fold contributed
    pub mean: Option<f64>,
    /// Population standard deviation of fold scores
    pub std: Option<f64>,
    /// `1 / number of categories`; `None` without categories
    pub chance_level: Option<f64>,
    /// Folds that contributed a score
    pub folds_used: usize,
    /// Folds excluded from the mean
    pub folds_skipped: usize,
}

impl AggregateScore {
    /// Aggregate fold results for an evaluation over `n_categories` classes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_folds(folds: &[FoldScore], n_categories: usize) -> Self {
        let scores: Vec<f64> = folds.iter().filter_map(FoldScore::score).collect();
        let (mean, std) = if scores.is_empty() {
            (None, None)
        } else {
            let n = scores.len() as f64;
            let mean = scores.iter().sum::<f64>() / n;
            let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
            (Some(mean), Some(var.sqrt()))
        };

        Self {
            mean,
            std,
            chance_level: chance_level(n_categories),
            folds_used: scores.len(),
            folds_skipped: folds.len() - scores.len(),
        }
    }

    /// True if at least one fold contributed.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.mean.is_some()
    }

    /// Mean on the 0-100 display scale.
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        self.mean.map(|m| m * 100.0)
    }

    /// Whether the mean exceeds chance; `None` when either is undefined.
    #[must_use]
    pub fn above_chance(&self) -> Option<bool> {
        self.mean.zip(self.chance_level).map(|(m, c)| m > c)
    }
}
