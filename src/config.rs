//! Decoder configuration
//!
//! Every knob the evaluation depends on lives here and is passed explicitly
//! into the evaluator: classifier (and its solver parameters),
//! standardization, cross-validation scheme and scoring metric.
//!
//! ```rust
//! use trueno_decode::config::DecoderConfig;
//! use trueno_decode::folds::CvScheme;
//!
//! let config = DecoderConfig::from_json_str(
//!     r#"{ "cv": { "type": "group_k_fold", "n_splits": 4 }, "scoring": "balanced_accuracy" }"#,
//! )?;
//! assert_eq!(config.cv, CvScheme::GroupKFold { n_splits: 4 });
//! # Ok::<(), trueno_decode::Error>(())
//! ```

use crate::classifier::ClassifierKind;
use crate::folds::CvScheme;
use crate::scaler::Standardization;
use crate::scoring::Scoring;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full decoding configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Classifier fitted on each training fold
    pub classifier: ClassifierKind,
    /// Feature standardization mode
    pub standardization: Standardization,
    /// Cross-validation scheme over runs
    pub cv: CvScheme,
    /// Fold scoring metric
    pub scoring: Scoring,
}

impl DecoderConfig {
    /// Set the classifier.
    #[must_use]
    pub const fn with_classifier(mut self, classifier: ClassifierKind) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the standardization mode.
    #[must_use]
    pub const fn with_standardization(mut self, standardization: Standardization) -> Self {
        self.standardization = standardization;
        self
    }

    /// Set the cross-validation scheme.
    #[must_use]
    pub const fn with_cv(mut self, cv: CvScheme) -> Self {
        self.cv = cv;
        self
    }

    /// Set the scoring metric.
    #[must_use]
    pub const fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        if let ClassifierKind::LinearSvm(params) = self.classifier {
            if !(params.c > 0.0 && params.c.is_finite()) {
                return Err(Error::InvalidConfig(format!(
                    "svm c must be positive and finite, got {}",
                    params.c
                )));
            }
            if !(params.tolerance > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "svm tolerance must be positive, got {}",
                    params.tolerance
                )));
            }
            if params.max_iter == 0 {
                return Err(Error::InvalidConfig(
                    "svm max_iter must be at least 1".to_string(),
                ));
            }
        }
        if let CvScheme::GroupKFold { n_splits: 0 } = self.cv {
            return Err(Error::InvalidConfig(
                "GroupKFold requires n_splits >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns error on malformed JSON or invalid parameters
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{SvmLoss, SvmParams};

    #[test]
    fn test_default_matches_classic_pipeline() {
        let config = DecoderConfig::default();
        assert_eq!(config.classifier, ClassifierKind::LinearSvm(SvmParams::default()));
        assert_eq!(config.standardization, Standardization::TrainFold);
        assert_eq!(config.cv, CvScheme::LeaveOneRunOut);
        assert_eq!(config.scoring, Scoring::Accuracy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_partial_svm_params() {
        let config = DecoderConfig::from_json_str(
            r#"{ "classifier": { "type": "linear_svm", "c": 0.5, "loss": "hinge" },
                 "standardization": "none" }"#,
        )
        .unwrap();
        let ClassifierKind::LinearSvm(params) = config.classifier else {
            panic!("expected linear svm");
        };
        assert_eq!(params.c, 0.5);
        assert_eq!(params.loss, SvmLoss::Hinge);
        assert_eq!(params.max_iter, SvmParams::default().max_iter);
        assert_eq!(config.standardization, Standardization::None);
    }

    #[test]
    fn test_json_round_trip() {
        let config = DecoderConfig::default()
            .with_classifier(ClassifierKind::Correlation)
            .with_cv(CvScheme::GroupKFold { n_splits: 3 })
            .with_scoring(Scoring::BalancedAccuracy);
        let parsed = DecoderConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let bad_c = DecoderConfig::default().with_classifier(ClassifierKind::LinearSvm(SvmParams {
            c: -1.0,
            ..SvmParams::default()
        }));
        assert!(matches!(bad_c.validate(), Err(Error::InvalidConfig(_))));

        let bad_cv = DecoderConfig::default().with_cv(CvScheme::GroupKFold { n_splits: 0 });
        assert!(matches!(bad_cv.validate(), Err(Error::InvalidConfig(_))));

        assert!(matches!(
            DecoderConfig::from_json_str("{ not json"),
            Err(Error::Json(_))
        ));
    }
}
