//! Linear support vector machine
//!
//! L2-regularized linear SVM solved in the dual by coordinate descent
//! (Hsieh et al. 2008, the liblinear solver). Samples are visited in a fixed
//! cyclic order, so the same data always yields the same weights.
//!
//! A constant bias feature of 1 is appended to every sample (and regularized
//! with the weights). Two classes train one model with the second class as
//! the positive side; more classes train one-vs-rest models and predict the
//! highest decision value.

use super::{argmax, training_classes, Classifier};
use crate::simd;
use crate::volume::FeatureMatrix;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Loss minimized by the solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvmLoss {
    /// Standard hinge loss (box-constrained dual)
    Hinge,
    /// Squared hinge loss
    #[default]
    SquaredHinge,
}

/// Solver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmParams {
    /// Inverse regularization strength
    pub c: f32,
    /// Loss function
    pub loss: SvmLoss,
    /// Stop when the projected-gradient spread falls below this value
    pub tolerance: f32,
    /// Maximum passes over the training set
    pub max_iter: usize,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            loss: SvmLoss::SquaredHinge,
            tolerance: 1e-4,
            max_iter: 1000,
        }
    }
}

const BIAS: f32 = 1.0;

/// One binary model: weights over features plus the bias weight.
#[derive(Debug, Clone, PartialEq)]
struct BinaryModel {
    weights: Vec<f32>,
    bias: f32,
}

impl BinaryModel {
    fn decision(&self, x: &[f32]) -> f32 {
        simd::dot(&self.weights, x) + self.bias * BIAS
    }
}

/// Linear SVM classifier.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    params: SvmParams,
    classes: Vec<String>,
    models: Vec<BinaryModel>,
    n_features: usize,
}

impl LinearSvm {
    /// Create an unfitted classifier.
    #[must_use]
    pub const fn new(params: SvmParams) -> Self {
        Self {
            params,
            classes: Vec::new(),
            models: Vec::new(),
            n_features: 0,
        }
    }

    /// Solver parameters.
    #[must_use]
    pub const fn params(&self) -> &SvmParams {
        &self.params
    }

    /// Weight vector of each fitted binary model.
    pub fn weights(&self) -> impl Iterator<Item = &[f32]> {
        self.models.iter().map(|m| m.weights.as_slice())
    }

    /// Decision values of one row, one per binary model.
    fn decisions(&self, x: &[f32]) -> Vec<f32> {
        self.models.iter().map(|m| m.decision(x)).collect()
    }

    /// Dual coordinate descent for targets `y` in {-1, +1}.
    fn train_binary(&self, x: &FeatureMatrix, y: &[f32]) -> BinaryModel {
        let n = x.n_samples();
        let (diag, upper) = match self.params.loss {
            SvmLoss::Hinge => (0.0, self.params.c),
            SvmLoss::SquaredHinge => (0.5 / self.params.c, f32::INFINITY),
        };

        let qd: Vec<f32> = x
            .rows()
            .map(|row| simd::dot(row, row) + BIAS * BIAS + diag)
            .collect();

        let mut alpha = vec![0.0f32; n];
        let mut w = vec![0.0f32; x.n_features()];
        let mut b = 0.0f32;
        let mut converged = false;

        for iter in 0..self.params.max_iter {
            let mut max_pg = f32::NEG_INFINITY;
            let mut min_pg = f32::INFINITY;

            for i in 0..n {
                let row = x.row(i);
                let g = y[i] * (simd::dot(&w, row) + b * BIAS) - 1.0 + diag * alpha[i];

                let pg = if alpha[i] == 0.0 {
                    g.min(0.0)
                } else if alpha[i] >= upper {
                    g.max(0.0)
                } else {
                    g
                };
                max_pg = max_pg.max(pg);
                min_pg = min_pg.min(pg);

                if pg.abs() > 1e-12 {
                    let old = alpha[i];
                    alpha[i] = (old - g / qd[i]).clamp(0.0, upper);
                    let delta = (alpha[i] - old) * y[i];
                    simd::axpy(delta, row, &mut w);
                    b += delta * BIAS;
                }
            }

            if max_pg - min_pg <= self.params.tolerance {
                tracing::trace!(iterations = iter + 1, "svm solver converged");
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                max_iter = self.params.max_iter,
                "svm solver did not converge; consider raising max_iter"
            );
        }

        BinaryModel { weights: w, bias: b }
    }
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new(SvmParams::default())
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[String]) -> Result<()> {
        if !(self.params.c > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "SVM C must be positive, got {}",
                self.params.c
            )));
        }
        let classes = training_classes(features, labels)?;

        let positives: Vec<&String> = if classes.len() == 2 {
            vec![&classes[1]]
        } else {
            classes.iter().collect()
        };

        let mut models = Vec::with_capacity(positives.len());
        for positive in positives {
            let y: Vec<f32> = labels
                .iter()
                .map(|l| if l == positive { 1.0 } else { -1.0 })
                .collect();
            models.push(self.train_binary(features, &y));
        }

        self.n_features = features.n_features();
        self.models = models;
        self.classes = classes;
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>> {
        if self.models.is_empty() {
            return Err(Error::Classifier("LinearSvm used before fit".to_string()));
        }
        if features.n_features() != self.n_features {
            return Err(Error::shape(
                "svm features",
                self.n_features,
                features.n_features(),
            ));
        }

        Ok(features
            .rows()
            .map(|row| {
                let scores = self.decisions(row);
                let idx = if self.classes.len() == 2 {
                    usize::from(scores[0] > 0.0)
                } else {
                    argmax(&scores)
                };
                self.classes[idx].clone()
            })
            .collect())
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }
}
