//! Region/contrast sweep
//!
//! Evaluates every (region, contrast) combination with the same evaluator and
//! collects one [`SweepRow`] per combination. A failing combination becomes a
//! flagged row; the remaining combinations still run.
//!
//! ## Example
//!
//! ```rust
//! use trueno_decode::evaluate::DecodingEvaluator;
//! use trueno_decode::labels::LabelTable;
//! use trueno_decode::sweep::{Contrast, Region, RegionContrastSweep};
//! use trueno_decode::volume::{FrameData, Mask};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let labels = LabelTable::from_pairs([
//!     ("face", 0), ("house", 0), ("face", 1), ("house", 1),
//! ]);
//! let data = FrameData::new([1, 1, 1], 4, vec![1.0, -1.0, 1.2, -0.8])?;
//!
//! let sweep = RegionContrastSweep::new(&data, &labels, DecodingEvaluator::default());
//! let table = sweep.run(
//!     &[Region::new("whole", Mask::full([1, 1, 1]))],
//!     &[Contrast::pair("face", "house"), Contrast::pair("face", "shoe")],
//! );
//!
//! assert_eq!(table.len(), 2);
//! assert!(table.rows()[0].is_ok());
//! assert!(!table.rows()[1].is_ok());
//! # Ok(())
//! # }
//! ```

mod table;

pub use table::{ResultsTable, RowStatus, SweepReport, SweepRow};

use crate::aggregate::chance_level;
use crate::evaluate::DecodingEvaluator;
use crate::labels::LabelTable;
use crate::volume::{FrameData, Mask};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named region-of-interest mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    name: String,
    mask: Mask,
}

impl Region {
    /// Create a named region.
    #[must_use]
    pub fn new(name: impl Into<String>, mask: Mask) -> Self {
        Self {
            name: name.into(),
            mask,
        }
    }

    /// Region name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Region mask.
    #[must_use]
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }
}

/// A named set of categories to discriminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contrast {
    name: String,
    categories: Vec<String>,
}

impl Contrast {
    /// Create a contrast over arbitrary categories.
    #[must_use]
    pub fn new<S: Into<String>>(name: impl Into<String>, categories: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Two-category contrast named `a vs b`.
    #[must_use]
    pub fn pair(a: &str, b: &str) -> Self {
        Self::new(format!("{a} vs {b}"), [a, b])
    }

    /// Every unordered pair of `categories`, in input order.
    #[must_use]
    pub fn all_pairs<S: AsRef<str>>(categories: &[S]) -> Vec<Self> {
        let mut pairs = Vec::new();
        for (i, a) in categories.iter().enumerate() {
            for b in &categories[i + 1..] {
                pairs.push(Self::pair(a.as_ref(), b.as_ref()));
            }
        }
        pairs
    }

    /// Contrast name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested categories.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of distinct requested categories.
    #[must_use]
    pub fn n_distinct(&self) -> usize {
        self.categories.iter().collect::<BTreeSet<_>>().len()
    }
}

/// Runs the evaluator over regions x contrasts for one dataset.
#[derive(Debug)]
pub struct RegionContrastSweep<'a> {
    data: &'a FrameData,
    labels: &'a LabelTable,
    evaluator: DecodingEvaluator,
}

impl<'a> RegionContrastSweep<'a> {
    /// Create a sweep over one dataset.
    #[must_use]
    pub const fn new(
        data: &'a FrameData,
        labels: &'a LabelTable,
        evaluator: DecodingEvaluator,
    ) -> Self {
        Self {
            data,
            labels,
            evaluator,
        }
    }

    /// Evaluator shared by every combination.
    #[must_use]
    pub const fn evaluator(&self) -> &DecodingEvaluator {
        &self.evaluator
    }

    /// Evaluate every combination. Rows are region-major, contrasts in the
    /// given order, regardless of whether the `parallel` feature is enabled.
    #[must_use]
    pub fn run(&self, regions: &[Region], contrasts: &[Contrast]) -> ResultsTable {
        let combos: Vec<(&Region, &Contrast)> = regions
            .iter()
            .flat_map(|r| contrasts.iter().map(move |c| (r, c)))
            .collect();

        tracing::info!(
            regions = regions.len(),
            contrasts = contrasts.len(),
            combinations = combos.len(),
            "starting region/contrast sweep"
        );

        #[cfg(feature = "parallel")]
        let rows: Vec<SweepRow> = {
            use rayon::prelude::*;
            combos
                .par_iter()
                .map(|(region, contrast)| self.evaluate_one(region, contrast))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<SweepRow> = combos
            .iter()
            .map(|(region, contrast)| self.evaluate_one(region, contrast))
            .collect();

        let table = ResultsTable::new(rows);
        tracing::info!(
            succeeded = table.succeeded().count(),
            failed = table.failed().count(),
            "sweep finished"
        );
        table
    }

    /// Evaluate one combination, converting any error into a failed row.
    #[must_use]
    pub fn evaluate_one(&self, region: &Region, contrast: &Contrast) -> SweepRow {
        let chance = chance_level(contrast.n_distinct());
        let result = self.evaluator.evaluate(
            self.data,
            self.labels,
            region.mask(),
            contrast.categories(),
        );

        let row = match result {
            Ok(evaluation) => match evaluation.failure() {
                None => SweepRow {
                    contrast: contrast.name().to_string(),
                    region: region.name().to_string(),
                    accuracy_pct: evaluation.aggregate.percent(),
                    std_pct: evaluation.aggregate.std.map(|s| s * 100.0),
                    chance_level: evaluation.aggregate.chance_level,
                    folds_used: evaluation.aggregate.folds_used,
                    folds_skipped: evaluation.aggregate.folds_skipped,
                    status: RowStatus::Ok,
                },
                Some((kind, reason)) => SweepRow {
                    contrast: contrast.name().to_string(),
                    region: region.name().to_string(),
                    accuracy_pct: None,
                    std_pct: None,
                    chance_level: chance,
                    folds_used: 0,
                    folds_skipped: evaluation.aggregate.folds_skipped,
                    status: RowStatus::Failed { kind, reason },
                },
            },
            Err(err) => SweepRow::failed(contrast.name(), region.name(), chance, &err),
        };

        match &row.status {
            RowStatus::Ok => tracing::info!(
                contrast = %row.contrast,
                region = %row.region,
                accuracy_pct = ?row.accuracy_pct,
                chance = ?row.chance_level,
                "combination evaluated"
            ),
            RowStatus::Failed { kind, reason } => tracing::warn!(
                contrast = %row.contrast,
                region = %row.region,
                %kind,
                "combination failed: {reason}"
            ),
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_contrast_pair_and_all_pairs() {
        let c = Contrast::pair("face", "house");
        assert_eq!(c.name(), "face vs house");
        assert_eq!(c.categories(), &["face", "house"]);
        assert_eq!(c.n_distinct(), 2);

        let pairs = Contrast::all_pairs(&["face", "house", "cat"]);
        let names: Vec<&str> = pairs.iter().map(Contrast::name).collect();
        assert_eq!(names, vec!["face vs house", "face vs cat", "house vs cat"]);
    }

    #[test]
    fn test_failed_row_keeps_chance_level() {
        let labels = LabelTable::from_pairs([("face", 0), ("house", 1)]);
        let data = FrameData::new([1, 1, 1], 2, vec![1.0, -1.0]).unwrap();
        let sweep = RegionContrastSweep::new(&data, &labels, DecodingEvaluator::default());

        let row = sweep.evaluate_one(
            &Region::new("bad", Mask::full([2, 1, 1])),
            &Contrast::pair("face", "house"),
        );
        assert_eq!(row.chance_level, Some(0.5));
        assert_eq!(row.accuracy_pct, None);
        assert!(matches!(
            row.status,
            RowStatus::Failed { kind: FailureKind::ShapeMismatch, .. }
        ));
    }

    #[test]
    fn test_empty_contrast_row_has_no_chance_level() {
        let labels = LabelTable::from_pairs([("face", 0), ("house", 1)]);
        let data = FrameData::new([1, 1, 1], 2, vec![1.0, -1.0]).unwrap();
        let sweep = RegionContrastSweep::new(&data, &labels, DecodingEvaluator::default());

        let empty: [&str; 0] = [];
        let row = sweep.evaluate_one(
            &Region::new("whole", Mask::full([1, 1, 1])),
            &Contrast::new("nothing", empty),
        );
        assert_eq!(row.chance_level, None);
        assert!(!row.is_ok());
    }

    #[test]
    fn test_rows_are_region_major() {
        let labels = LabelTable::from_pairs([("face", 0), ("house", 0), ("face", 1), ("house", 1)]);
        let data = FrameData::new([2, 1, 1], 4, vec![1.0, 0.0, -1.0, 0.0, 1.0, 0.1, -1.0, 0.1]).unwrap();
        let sweep = RegionContrastSweep::new(&data, &labels, DecodingEvaluator::default());
        let regions = [
            Region::new("a", Mask::new([2, 1, 1], vec![true, false]).unwrap()),
            Region::new("b", Mask::full([2, 1, 1])),
        ];
        let contrasts = [Contrast::pair("face", "house"), Contrast::pair("face", "cat")];

        let table = sweep.run(&regions, &contrasts);
        let keys: Vec<(&str, &str)> = table
            .rows()
            .iter()
            .map(|r| (r.region.as_str(), r.contrast.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a", "face vs house"),
                ("a", "face vs cat"),
                ("b", "face vs house"),
                ("b", "face vs cat"),
            ]
        );
        assert_eq!(table.succeeded().count(), 2);
        assert_eq!(table.failed().count(), 2);
    }
}
