//! Label tables: typed `(label, run)` records aligned to data frames
//!
//! Each frame of the volumetric data has exactly one [`TrialLabel`] at the
//! same position. Column access by name only happens at the loading boundary
//! (see [`source`]); everything downstream works with typed records.
//!
//! ## Example
//!
//! ```rust
//! use trueno_decode::labels::LabelTable;
//!
//! let table = LabelTable::from_pairs([("rest", 0), ("face", 0), ("house", 1)]);
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.distinct_runs(), vec![0, 1]);
//! assert_eq!(table.categories(), vec!["face", "house", "rest"]);
//! ```

mod source;

pub use source::{LABEL_COLUMN_NAMES, RUN_COLUMN_NAMES};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stimulus category and acquisition run of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialLabel {
    label: String,
    run: i64,
}

impl TrialLabel {
    /// Create a new record.
    #[must_use]
    pub fn new(label: impl Into<String>, run: i64) -> Self {
        Self {
            label: label.into(),
            run,
        }
    }

    /// Stimulus category (e.g. `face`, `house`, `rest`).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Acquisition run identifier.
    #[must_use]
    pub const fn run(&self) -> i64 {
        self.run
    }
}

/// Ordered label records, one per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTable {
    records: Vec<TrialLabel>,
}

impl LabelTable {
    /// Create a table from records in frame order.
    #[must_use]
    pub fn new(records: Vec<TrialLabel>) -> Self {
        Self { records }
    }

    /// Create a table from `(label, run)` pairs in frame order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            records: pairs
                .into_iter()
                .map(|(label, run)| TrialLabel::new(label, run))
                .collect(),
        }
    }

    /// Number of frames described.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the table describes no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in frame order.
    #[must_use]
    pub fn records(&self) -> &[TrialLabel] {
        &self.records
    }

    /// Record at frame `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TrialLabel> {
        self.records.get(index)
    }

    /// Iterate over records in frame order.
    pub fn iter(&self) -> std::slice::Iter<'_, TrialLabel> {
        self.records.iter()
    }

    /// Distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.label.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct run identifiers, ascending.
    #[must_use]
    pub fn distinct_runs(&self) -> Vec<i64> {
        self.records
            .iter()
            .map(TrialLabel::run)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of frames carrying `label`.
    #[must_use]
    pub fn count_label(&self, label: &str) -> usize {
        self.records.iter().filter(|r| r.label == label).count()
    }
}

impl<'a> IntoIterator for &'a LabelTable {
    type Item = &'a TrialLabel;
    type IntoIter = std::slice::Iter<'a, TrialLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<TrialLabel> for LabelTable {
    fn from_iter<T: IntoIterator<Item = TrialLabel>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_preserves_order() {
        let table = LabelTable::from_pairs([("face", 2), ("house", 0), ("face", 1)]);
        let labels: Vec<&str> = table.iter().map(TrialLabel::label).collect();
        assert_eq!(labels, vec!["face", "house", "face"]);
        assert_eq!(table.get(1).map(TrialLabel::run), Some(0));
    }

    #[test]
    fn test_categories_and_runs_are_sorted_and_distinct() {
        let table = LabelTable::from_pairs([
            ("rest", 3),
            ("face", 1),
            ("rest", 1),
            ("cat", 3),
        ]);
        assert_eq!(table.categories(), vec!["cat", "face", "rest"]);
        assert_eq!(table.distinct_runs(), vec![1, 3]);
        assert_eq!(table.count_label("rest"), 2);
    }

    #[test]
    fn test_empty_table() {
        let table = LabelTable::default();
        assert!(table.is_empty());
        assert!(table.categories().is_empty());
        assert!(table.distinct_runs().is_empty());
    }
}
