//! Correlation-to-centroid classifier (Haxby et al. 2001)
//!
//! Each class is represented by its mean training pattern. A test pattern is
//! assigned to the class whose mean it correlates with most strongly.

use super::{argmax, training_classes, Classifier};
use crate::simd;
use crate::volume::FeatureMatrix;
use crate::{Error, Result};

/// Nearest centroid by Pearson correlation.
#[derive(Debug, Clone, Default)]
pub struct CorrelationClassifier {
    classes: Vec<String>,
    centroids: Vec<Vec<f32>>,
}

impl CorrelationClassifier {
    /// Create an unfitted classifier.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            classes: Vec::new(),
            centroids: Vec::new(),
        }
    }

    /// Mean training pattern of each class, in class order.
    #[must_use]
    pub fn centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }
}

impl Classifier for CorrelationClassifier {
    #[allow(clippy::cast_precision_loss)]
    fn fit(&mut self, features: &FeatureMatrix, labels: &[String]) -> Result<()> {
        let classes = training_classes(features, labels)?;
        let d = features.n_features();

        let mut sums = vec![vec![0.0f32; d]; classes.len()];
        let mut counts = vec![0usize; classes.len()];
        for (row, label) in features.rows().zip(labels) {
            // classes came from labels, so the search always succeeds
            if let Ok(k) = classes.binary_search(label) {
                simd::axpy(1.0, row, &mut sums[k]);
                counts[k] += 1;
            }
        }
        for (sum, &count) in sums.iter_mut().zip(&counts) {
            let inv = 1.0 / count.max(1) as f32;
            sum.iter_mut().for_each(|v| *v *= inv);
        }

        self.classes = classes;
        self.centroids = sums;
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>> {
        let Some(first) = self.centroids.first() else {
            return Err(Error::Classifier(
                "CorrelationClassifier used before fit".to_string(),
            ));
        };
        if features.n_features() != first.len() {
            return Err(Error::shape(
                "correlation features",
                first.len(),
                features.n_features(),
            ));
        }

        Ok(features
            .rows()
            .map(|row| {
                let scores: Vec<f32> = self
                    .centroids
                    .iter()
                    .map(|c| simd::pearson(row, c))
                    .collect();
                self.classes[argmax(&scores)].clone()
            })
            .collect())
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }
}
