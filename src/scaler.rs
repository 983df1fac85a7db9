//! Train-fold feature standardization
//!
//! Statistics come from the training rows only and are then applied to both
//! sides of the split, so the test fold never leaks into the fit.

use crate::volume::FeatureMatrix;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Whether features are z-scored before fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standardization {
    /// Use features as given
    None,
    /// Zero mean, unit variance from the training fold
    #[default]
    TrainFold,
}

/// Per-feature mean and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl StandardScaler {
    /// Estimate mean and population standard deviation of each column.
    ///
    /// Zero-variance columns get a scale of 1 so they map to 0.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `train` has no rows
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn fit(train: &FeatureMatrix) -> Result<Self> {
        if train.is_empty() {
            return Err(Error::InvalidInput(
                "Cannot fit scaler on zero samples".to_string(),
            ));
        }

        let n = train.n_samples() as f64;
        let d = train.n_features();
        let mut sum = vec![0.0f64; d];
        let mut sum_sq = vec![0.0f64; d];
        for row in train.rows() {
            for (j, &v) in row.iter().enumerate() {
                let v = f64::from(v);
                sum[j] += v;
                sum_sq[j] += v * v;
            }
        }

        let mut mean = Vec::with_capacity(d);
        let mut scale = Vec::with_capacity(d);
        for j in 0..d {
            let m = sum[j] / n;
            let var = (sum_sq[j] / n - m * m).max(0.0);
            let sd = var.sqrt();
            mean.push(m as f32);
            scale.push(if sd > 1e-12 { sd as f32 } else { 1.0 });
        }

        Ok(Self { mean, scale })
    }

    /// Standardize `features` in place.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the column count differs from the fit
    pub fn transform(&self, features: &mut FeatureMatrix) -> Result<()> {
        if features.n_features() != self.mean.len() {
            return Err(Error::shape(
                "scaler features",
                self.mean.len(),
                features.n_features(),
            ));
        }
        let d = self.mean.len();
        if d == 0 {
            return Ok(());
        }
        for row in features.as_mut_slice().chunks_exact_mut(d) {
            for ((v, m), s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
                *v = (*v - m) / s;
            }
        }
        Ok(())
    }

    /// Per-feature means.
    #[must_use]
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Per-feature scales.
    #[must_use]
    pub fn scale(&self) -> &[f32] {
        &self.scale
    }
}
