//! Per-fold classifiers
//!
//! The evaluator only sees the [`Classifier`] trait: `fit` on the training
//! fold, `predict` on the test fold. Two implementations ship with the crate:
//!
//! - [`LinearSvm`]: linear maximum-margin classifier (one-vs-rest), trained by
//!   deterministic dual coordinate descent
//! - [`CorrelationClassifier`]: nearest class centroid by Pearson correlation,
//!   the pattern-similarity rule of Haxby et al. (2001)
//!
//! Any other model can be plugged in through [`ClassifierFactory`].

mod correlation;
mod svm;

pub use correlation::CorrelationClassifier;
pub use svm::{LinearSvm, SvmLoss, SvmParams};

use crate::volume::FeatureMatrix;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Supervised classifier over feature rows and string labels.
pub trait Classifier: Send {
    /// Fit on `features` (one row per sample) and aligned `labels`.
    ///
    /// # Errors
    /// Returns error if shapes disagree or fewer than two classes are present
    fn fit(&mut self, features: &FeatureMatrix, labels: &[String]) -> Result<()>;

    /// Predict one label per row.
    ///
    /// # Errors
    /// Returns error if called before `fit` or with a different feature count
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>>;

    /// Classes seen during fitting, sorted.
    fn classes(&self) -> &[String];
}

/// Produces a fresh, unfitted classifier for every fold.
pub trait ClassifierFactory: Send + Sync {
    /// Build an unfitted classifier.
    fn build(&self) -> Box<dyn Classifier>;
}

impl<F> ClassifierFactory for F
where
    F: Fn() -> Box<dyn Classifier> + Send + Sync,
{
    fn build(&self) -> Box<dyn Classifier> {
        self()
    }
}

/// Built-in classifier selection, part of [`DecoderConfig`](crate::config::DecoderConfig).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ClassifierKind {
    /// Linear kernel support vector machine
    LinearSvm(SvmParams),
    /// Correlation to class centroids
    Correlation,
}

impl Default for ClassifierKind {
    fn default() -> Self {
        Self::LinearSvm(SvmParams::default())
    }
}

impl ClassifierFactory for ClassifierKind {
    fn build(&self) -> Box<dyn Classifier> {
        match *self {
            Self::LinearSvm(params) => Box::new(LinearSvm::new(params)),
            Self::Correlation => Box::new(CorrelationClassifier::new()),
        }
    }
}

/// Validate a training set and return its sorted distinct classes.
pub(crate) fn training_classes(features: &FeatureMatrix, labels: &[String]) -> Result<Vec<String>> {
    if features.n_samples() != labels.len() {
        return Err(Error::shape(
            "features vs labels",
            features.n_samples(),
            labels.len(),
        ));
    }
    let classes: Vec<String> = labels
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect();
    if classes.len() < 2 {
        return Err(Error::InsufficientClasses {
            found: classes.len(),
        });
    }
    Ok(classes)
}

/// Index of the largest score; ties go to the lowest index.
pub(crate) fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = i;
        }
    }
    best
}
