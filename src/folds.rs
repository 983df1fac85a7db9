//! Run-grouped cross-validation folds
//!
//! Folds are keyed by run identifier so that no run contributes frames to
//! both sides of one split. Folds come out in ascending run order; the
//! aggregate is an order-independent mean, the ordering only keeps reports
//! deterministic.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-validation scheme over run identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CvScheme {
    /// One fold per distinct run; that run is the test set.
    #[default]
    LeaveOneRunOut,
    /// Sorted runs dealt round-robin into `n_splits` test groups.
    GroupKFold {
        /// Number of folds (clamped to the number of distinct runs)
        n_splits: usize,
    },
}

/// One train/test split. Indices refer to positions in the selection the
/// folds were built from, not to frames of the original table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// Runs held out as the test set, ascending
    pub test_runs: Vec<i64>,
    /// Positions used for fitting
    pub train: Vec<usize>,
    /// Positions used for scoring
    pub test: Vec<usize>,
}

impl Fold {
    /// Human-readable key for logs and reports (`run 3`, `runs 0+4`).
    #[must_use]
    pub fn key(&self) -> String {
        match self.test_runs.as_slice() {
            [run] => format!("run {run}"),
            runs => format!(
                "runs {}",
                runs.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("+")
            ),
        }
    }
}

/// Positions grouped by run, ascending by run.
fn positions_by_run(runs: &[i64]) -> BTreeMap<i64, Vec<usize>> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (pos, &run) in runs.iter().enumerate() {
        groups.entry(run).or_default().push(pos);
    }
    groups
}

/// Leave-one-run-out folds.
///
/// A single distinct run yields one fold with an empty train set; empty
/// input yields no folds.
///
/// # Example
///
/// ```rust
/// use trueno_decode::folds::leave_one_run_out;
///
/// let folds = leave_one_run_out(&[2, 0, 2, 1]);
/// assert_eq!(folds.len(), 3);
/// assert_eq!(folds[0].test_runs, vec![0]);
/// assert_eq!(folds[2].test, vec![0, 2]);
/// assert_eq!(folds[2].train, vec![1, 3]);
/// ```
#[must_use]
pub fn leave_one_run_out(runs: &[i64]) -> Vec<Fold> {
    let groups = positions_by_run(runs);
    groups
        .into_iter()
        .map(|(run, test)| Fold {
            test_runs: vec![run],
            train: complement(runs.len(), &test),
            test,
        })
        .collect()
}

/// Grouped k-fold: distinct runs (ascending) are dealt round-robin into
/// `n_splits` test groups.
///
/// # Errors
/// Returns `InvalidConfig` if `n_splits` is zero
pub fn group_k_fold(runs: &[i64], n_splits: usize) -> Result<Vec<Fold>> {
    if n_splits == 0 {
        return Err(Error::InvalidConfig(
            "GroupKFold requires n_splits >= 1".to_string(),
        ));
    }

    let groups = positions_by_run(runs);
    let k = n_splits.min(groups.len());
    let mut buckets: Vec<(Vec<i64>, Vec<usize>)> = vec![(Vec::new(), Vec::new()); k];
    for (i, (run, positions)) in groups.into_iter().enumerate() {
        let bucket = &mut buckets[i % k];
        bucket.0.push(run);
        bucket.1.extend(positions);
    }

    Ok(buckets
        .into_iter()
        .map(|(test_runs, mut test)| {
            test.sort_unstable();
            Fold {
                test_runs,
                train: complement(runs.len(), &test),
                test,
            }
        })
        .collect())
}

/// Build folds for `scheme`.
///
/// # Errors
/// Returns `InvalidConfig` for a degenerate scheme
pub fn partition(runs: &[i64], scheme: CvScheme) -> Result<Vec<Fold>> {
    match scheme {
        CvScheme::LeaveOneRunOut => Ok(leave_one_run_out(runs)),
        CvScheme::GroupKFold { n_splits } => group_k_fold(runs, n_splits),
    }
}

/// Positions `0..len` not in the sorted slice `excluded`.
fn complement(len: usize, excluded: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(len.saturating_sub(excluded.len()));
    let mut skip = excluded.iter().peekable();
    for pos in 0..len {
        if skip.peek() == Some(&&pos) {
            skip.next();
        } else {
            out.push(pos);
        }
    }
    out
}
