//! Cross-validated decoding of one (mask, category set) combination
//!
//! Chain: trial selection -> masking -> fold partitioning -> per-fold
//! standardize/fit/predict/score -> aggregation.
//!
//! Whole-combination problems (shape mismatches, absent categories) are
//! returned as errors. Per-fold problems (no training runs, a single class in
//! the training split) skip that fold with a reason; the aggregate is then
//! computed from the remaining folds.

use crate::aggregate::{AggregateScore, FoldOutcome, FoldScore};
use crate::classifier::ClassifierFactory;
use crate::config::DecoderConfig;
use crate::error::FailureKind;
use crate::folds::{partition, Fold};
use crate::labels::LabelTable;
use crate::scaler::{StandardScaler, Standardization};
use crate::selection::{missing_categories, select_trials, Selection};
use crate::volume::{FeatureMatrix, FrameData, Mask};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Everything produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Distinct categories evaluated, sorted
    pub categories: Vec<String>,
    /// Number of selected frames
    pub n_samples: usize,
    /// Number of in-mask voxels
    pub n_features: usize,
    /// Per-fold results in fold order
    pub folds: Vec<FoldScore>,
    /// Aggregate over contributing folds
    pub aggregate: AggregateScore,
}

impl Evaluation {
    /// Why the aggregate is undefined, or `None` if it is defined.
    ///
    /// The kind is taken from the first skipped fold; the reason lists every
    /// skipped fold.
    #[must_use]
    pub fn failure(&self) -> Option<(FailureKind, String)> {
        if self.aggregate.is_defined() {
            return None;
        }
        let mut kind = FailureKind::InsufficientRuns;
        let mut reasons = Vec::new();
        for (i, fold) in self.folds.iter().enumerate() {
            if let FoldOutcome::Skipped { kind: k, reason } = &fold.outcome {
                if i == 0 {
                    kind = *k;
                }
                reasons.push(reason.as_str());
            }
        }
        let reason = if reasons.is_empty() {
            "no folds to evaluate".to_string()
        } else {
            format!("no fold produced a score: {}", reasons.join("; "))
        };
        Some((kind, reason))
    }
}

/// Runs the decoding chain with an explicit configuration.
#[derive(Clone)]
pub struct DecodingEvaluator {
    config: DecoderConfig,
    factory: Arc<dyn ClassifierFactory>,
}

impl std::fmt::Debug for DecodingEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodingEvaluator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for DecodingEvaluator {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl DecodingEvaluator {
    /// Evaluator using the classifier named in `config`.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            factory: Arc::new(config.classifier),
        }
    }

    /// Evaluator with a custom classifier; `config.classifier` is ignored.
    #[must_use]
    pub fn with_factory(config: DecoderConfig, factory: impl ClassifierFactory + 'static) -> Self {
        Self {
            config,
            factory: Arc::new(factory),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Cross-validate decoding of `categories` from the `mask` voxels.
    ///
    /// # Errors
    /// - `InvalidInput` if `categories` is empty
    /// - `ShapeMismatch` if labels, data and mask disagree
    /// - `InvalidInput` if the mask selects no voxels
    /// - `EmptySelection` if a requested category never occurs
    /// - `InvalidConfig` for a degenerate configuration
    pub fn evaluate<S: AsRef<str>>(
        &self,
        data: &FrameData,
        labels: &LabelTable,
        mask: &Mask,
        categories: &[S],
    ) -> Result<Evaluation> {
        self.config.validate()?;

        let wanted: Vec<String> = categories
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if wanted.is_empty() {
            return Err(Error::InvalidInput(
                "At least one category is required".to_string(),
            ));
        }
        if labels.len() != data.n_frames() {
            return Err(Error::shape("labels vs frames", data.n_frames(), labels.len()));
        }
        if mask.shape() != data.shape() {
            return Err(Error::shape("mask vs data", data.shape(), mask.shape()));
        }
        if mask.is_empty() {
            return Err(Error::InvalidInput(
                "Mask selects no voxels".to_string(),
            ));
        }

        let missing = missing_categories(labels, &wanted);
        if !missing.is_empty() {
            return Err(Error::EmptySelection { missing });
        }

        let selection = select_trials(labels, &wanted);
        let features = data.masked_frames(mask, &selection.indices)?;
        let folds = partition(&selection.runs, self.config.cv)?;

        let fold_scores: Vec<FoldScore> = folds
            .iter()
            .map(|fold| self.run_fold(fold, &features, &selection))
            .collect();

        let aggregate = AggregateScore::from_folds(&fold_scores, wanted.len());
        tracing::debug!(
            categories = ?wanted,
            samples = selection.len(),
            voxels = features.n_features(),
            folds_used = aggregate.folds_used,
            folds_skipped = aggregate.folds_skipped,
            mean = ?aggregate.mean,
            "evaluation finished"
        );

        Ok(Evaluation {
            categories: wanted,
            n_samples: selection.len(),
            n_features: features.n_features(),
            folds: fold_scores,
            aggregate,
        })
    }

    fn run_fold(&self, fold: &Fold, features: &FeatureMatrix, selection: &Selection) -> FoldScore {
        let skipped = |kind: FailureKind, reason: String| FoldScore {
            test_runs: fold.test_runs.clone(),
            n_train: fold.train.len(),
            n_test: fold.test.len(),
            predictions: Vec::new(),
            outcome: FoldOutcome::Skipped { kind, reason },
        };

        if fold.test.is_empty() {
            return skipped(
                FailureKind::Other,
                format!("{}: empty test fold", fold.key()),
            );
        }
        if fold.train.is_empty() {
            let found = selection.runs.iter().collect::<BTreeSet<_>>().len();
            let err = Error::InsufficientRuns { found };
            tracing::debug!(fold = %fold.key(), "skipping fold: {err}");
            return skipped(err.kind(), format!("{}: {err}", fold.key()));
        }

        match self.fit_predict(fold, features, selection) {
            Ok((predictions, truth)) => {
                let outcome = match self.config.scoring.score(&truth, &predictions) {
                    Some(score) => FoldOutcome::Scored { score },
                    None => FoldOutcome::Skipped {
                        kind: FailureKind::Other,
                        reason: format!("{}: empty test fold", fold.key()),
                    },
                };
                tracing::debug!(fold = %fold.key(), ?outcome, "fold scored");
                FoldScore {
                    test_runs: fold.test_runs.clone(),
                    n_train: fold.train.len(),
                    n_test: fold.test.len(),
                    predictions,
                    outcome,
                }
            }
            Err(err) => {
                tracing::debug!(fold = %fold.key(), "skipping fold: {err}");
                skipped(err.kind(), format!("{}: {err}", fold.key()))
            }
        }
    }

    /// Fit on the training side and predict the test side. Returns
    /// `(predictions, true labels)` of the test samples.
    fn fit_predict(
        &self,
        fold: &Fold,
        features: &FeatureMatrix,
        selection: &Selection,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let mut x_train = features.select_rows(&fold.train)?;
        let mut x_test = features.select_rows(&fold.test)?;
        let y_train: Vec<String> = fold
            .train
            .iter()
            .map(|&i| selection.labels[i].clone())
            .collect();
        let y_test: Vec<String> = fold
            .test
            .iter()
            .map(|&i| selection.labels[i].clone())
            .collect();

        if self.config.standardization == Standardization::TrainFold {
            let scaler = StandardScaler::fit(&x_train)?;
            scaler.transform(&mut x_train)?;
            scaler.transform(&mut x_test)?;
        }

        let mut classifier = self.factory.build();
        classifier.fit(&x_train, &y_train)?;
        let predictions = classifier.predict(&x_test)?;
        if predictions.len() != x_test.n_samples() {
            return Err(Error::shape(
                "predictions vs test rows",
                x_test.n_samples(),
                predictions.len(),
            ));
        }
        Ok((predictions, y_test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, ClassifierKind};
    use crate::folds::CvScheme;

    /// Two voxels; voxel 0 is +1 for faces and -1 for houses.
    fn face_house(runs: &[i64]) -> (FrameData, LabelTable) {
        let mut labels = Vec::new();
        let mut data = Vec::new();
        for (i, &run) in runs.iter().enumerate() {
            let (label, sign) = if i % 2 == 0 { ("face", 1.0) } else { ("house", -1.0) };
            labels.push((label, run));
            #[allow(clippy::cast_precision_loss)]
            data.extend([sign * 2.0, 0.01 * i as f32]);
        }
        (
            FrameData::new([2, 1, 1], runs.len(), data).unwrap(),
            LabelTable::from_pairs(labels),
        )
    }

    #[test]
    fn test_perfect_separation_three_runs() {
        let (data, labels) = face_house(&[0, 0, 1, 1, 2, 2, 0, 0, 1, 1, 2, 2]);
        let eval = DecodingEvaluator::default()
            .evaluate(&data, &labels, &Mask::full([2, 1, 1]), &["face", "house"])
            .unwrap();
        assert_eq!(eval.folds.len(), 3);
        assert_eq!(eval.aggregate.mean, Some(1.0));
        assert_eq!(eval.aggregate.chance_level, Some(0.5));
        assert_eq!(eval.n_samples, 12);
        assert!(eval.failure().is_none());
    }

    #[test]
    fn test_correlation_classifier_config() {
        let (data, labels) = face_house(&[0, 0, 1, 1, 2, 2]);
        let config = DecoderConfig::default()
            .with_classifier(ClassifierKind::Correlation)
            .with_standardization(Standardization::None);
        let eval = DecodingEvaluator::new(config)
            .evaluate(&data, &labels, &Mask::full([2, 1, 1]), &["face", "house"])
            .unwrap();
        assert_eq!(eval.aggregate.folds_used, 3);
    }

    #[test]
    fn test_absent_category_is_empty_selection() {
        let (data, labels) = face_house(&[0, 0, 1, 1]);
        let err = DecodingEvaluator::default()
            .evaluate(&data, &labels, &Mask::full([2, 1, 1]), &["face", "shoe"])
            .unwrap_err();
        assert!(matches!(err, Error::EmptySelection { ref missing } if missing == &["shoe"]));
    }

    #[test]
    fn test_single_run_undefined_with_insufficient_runs() {
        let (data, labels) = face_house(&[4, 4, 4, 4]);
        let eval = DecodingEvaluator::default()
            .evaluate(&data, &labels, &Mask::full([2, 1, 1]), &["face", "house"])
            .unwrap();
        assert_eq!(eval.folds.len(), 1);
        assert!(!eval.aggregate.is_defined());
        let (kind, reason) = eval.failure().unwrap();
        assert_eq!(kind, FailureKind::InsufficientRuns);
        assert!(reason.contains("run 4"));
    }

    #[test]
    fn test_single_class_training_fold_is_skipped() {
        // Run 0 holds the only house: its fold trains on faces alone.
        let labels = LabelTable::from_pairs([
            ("house", 0),
            ("face", 0),
            ("face", 1),
            ("face", 1),
            ("face", 2),
            ("face", 2),
        ]);
        let data = FrameData::new([1, 1, 1], 6, vec![-1.0, 1.1, 1.0, 0.9, 1.2, 1.3]).unwrap();
        let eval = DecodingEvaluator::default()
            .evaluate(&data, &labels, &Mask::full([1, 1, 1]), &["face", "house"])
            .unwrap();
        assert_eq!(eval.aggregate.folds_used, 2);
        assert_eq!(eval.aggregate.folds_skipped, 1);
        assert!(matches!(
            eval.folds[0].outcome,
            FoldOutcome::Skipped { kind: FailureKind::InsufficientClasses, .. }
        ));
    }

    #[test]
    fn test_shape_mismatches() {
        let (data, labels) = face_house(&[0, 0, 1, 1]);
        let evaluator = DecodingEvaluator::default();

        let err = evaluator
            .evaluate(&data, &labels, &Mask::full([3, 1, 1]), &["face"])
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::ShapeMismatch);

        let short = LabelTable::from_pairs([("face", 0)]);
        let err = evaluator
            .evaluate(&data, &short, &Mask::full([2, 1, 1]), &["face"])
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::ShapeMismatch);
    }

    #[test]
    fn test_empty_mask_rejected() {
        let (data, labels) = face_house(&[0, 0, 1, 1, 2, 2]);
        let empty = Mask::new([2, 1, 1], vec![false, false]).unwrap();
        for kind in [ClassifierKind::default(), ClassifierKind::Correlation] {
            let err = DecodingEvaluator::new(DecoderConfig::default().with_classifier(kind))
                .evaluate(&data, &labels, &empty, &["face", "house"])
                .unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
    }

    #[test]
    fn test_short_predictions_skip_every_fold() {
        struct Silent(Vec<String>);
        impl Classifier for Silent {
            fn fit(&mut self, _: &FeatureMatrix, _: &[String]) -> Result<()> {
                Ok(())
            }
            fn predict(&self, _: &FeatureMatrix) -> Result<Vec<String>> {
                Ok(Vec::new())
            }
            fn classes(&self) -> &[String] {
                &self.0
            }
        }

        let (data, labels) = face_house(&[0, 0, 1, 1, 2, 2]);
        let evaluator = DecodingEvaluator::with_factory(DecoderConfig::default(), || -> Box<dyn Classifier> {
            Box::new(Silent(Vec::new()))
        });
        let eval = evaluator
            .evaluate(&data, &labels, &Mask::full([2, 1, 1]), &["face", "house"])
            .unwrap();

        assert_eq!(eval.aggregate.folds_used, 0);
        assert_eq!(eval.aggregate.folds_skipped, 3);
        assert_eq!(eval.aggregate.mean, None);
        let (kind, reason) = eval.failure().unwrap();
        assert_eq!(kind, FailureKind::ShapeMismatch);
        assert!(reason.contains("predictions vs test rows"));
    }

    #[test]
    fn test_custom_factory_and_group_k_fold() {
        struct Always(Vec<String>);
        impl Classifier for Always {
            fn fit(&mut self, _: &FeatureMatrix, _: &[String]) -> Result<()> {
                Ok(())
            }
            fn predict(&self, x: &FeatureMatrix) -> Result<Vec<String>> {
                Ok(vec![self.0[0].clone(); x.n_samples()])
            }
            fn classes(&self) -> &[String] {
                &self.0
            }
        }

        let (data, labels) = face_house(&[0, 0, 1, 1, 2, 2, 3, 3]);
        let config = DecoderConfig::default().with_cv(CvScheme::GroupKFold { n_splits: 2 });
        let evaluator = DecodingEvaluator::with_factory(config, || -> Box<dyn Classifier> {
            Box::new(Always(vec!["face".to_string()]))
        });
        let eval = evaluator
            .evaluate(&data, &labels, &Mask::full([2, 1, 1]), &["face", "house"])
            .unwrap();
        assert_eq!(eval.folds.len(), 2);
        assert_eq!(eval.aggregate.mean, Some(0.5));
    }
}
