//! Fold scoring metrics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric applied to each test fold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Fraction of exact label matches
    #[default]
    Accuracy,
    /// Mean per-class recall over classes present in the fold
    BalancedAccuracy,
}

impl Scoring {
    /// Score `predicted` against `truth`. `None` for an empty fold or when
    /// the two slices differ in length; such a fold must be excluded from the
    /// aggregate rather than counted as zero.
    #[must_use]
    pub fn score<T: AsRef<str>, P: AsRef<str>>(self, truth: &[T], predicted: &[P]) -> Option<f64> {
        if truth.is_empty() || truth.len() != predicted.len() {
            return None;
        }
        match self {
            Self::Accuracy => Some(accuracy(truth, predicted)),
            Self::BalancedAccuracy => Some(balanced_accuracy(truth, predicted)),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn accuracy<T: AsRef<str>, P: AsRef<str>>(truth: &[T], predicted: &[P]) -> f64 {
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t.as_ref() == p.as_ref())
        .count();
    correct as f64 / truth.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn balanced_accuracy<T: AsRef<str>, P: AsRef<str>>(truth: &[T], predicted: &[P]) -> f64 {
    // class -> (correct, total)
    let mut per_class: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (t, p) in truth.iter().zip(predicted) {
        let entry = per_class.entry(t.as_ref()).or_default();
        entry.1 += 1;
        if t.as_ref() == p.as_ref() {
            entry.0 += 1;
        }
    }
    let recall_sum: f64 = per_class
        .values()
        .map(|&(correct, total)| correct as f64 / total as f64)
        .sum();
    recall_sum / per_class.len() as f64
}
