//! Trial selection: restrict a label table to a set of categories
//!
//! Selection is a pure filter. A category that never occurs produces an empty
//! selection rather than an error; callers decide whether that is fatal via
//! [`missing_categories`].

use crate::labels::{LabelTable, TrialLabel};
use rustc_hash::FxHashSet;

/// Frames of a label table that belong to the requested categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Frame positions in the original table, ascending
    pub indices: Vec<usize>,
    /// Labels at those positions
    pub labels: Vec<String>,
    /// Run identifiers at those positions
    pub runs: Vec<i64>,
}

impl Selection {
    /// Number of selected frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push(&mut self, index: usize, record: &TrialLabel) {
        self.indices.push(index);
        self.labels.push(record.label().to_string());
        self.runs.push(record.run());
    }
}

/// Select the frames whose label is one of `wanted`, in original order.
///
/// # Example
///
/// ```rust
/// use trueno_decode::labels::LabelTable;
/// use trueno_decode::selection::select_trials;
///
/// let table = LabelTable::from_pairs([("rest", 0), ("face", 0), ("house", 1), ("face", 1)]);
/// let sel = select_trials(&table, &["face", "house"]);
/// assert_eq!(sel.indices, vec![1, 2, 3]);
/// assert_eq!(sel.runs, vec![0, 1, 1]);
/// ```
#[must_use]
pub fn select_trials<S: AsRef<str>>(table: &LabelTable, wanted: &[S]) -> Selection {
    let wanted: FxHashSet<&str> = wanted.iter().map(AsRef::as_ref).collect();
    filter(table, |label| wanted.contains(label))
}

/// Select every frame whose label is NOT in `excluded` (e.g. drop `rest`).
#[must_use]
pub fn exclude_trials<S: AsRef<str>>(table: &LabelTable, excluded: &[S]) -> Selection {
    let excluded: FxHashSet<&str> = excluded.iter().map(AsRef::as_ref).collect();
    filter(table, |label| !excluded.contains(label))
}

/// Requested categories that never occur in `table`, in request order.
#[must_use]
pub fn missing_categories<S: AsRef<str>>(table: &LabelTable, wanted: &[S]) -> Vec<String> {
    let present: FxHashSet<&str> = table.iter().map(TrialLabel::label).collect();
    let mut seen = FxHashSet::default();
    wanted
        .iter()
        .map(AsRef::as_ref)
        .filter(|w| !present.contains(w) && seen.insert(*w))
        .map(str::to_string)
        .collect()
}

fn filter(table: &LabelTable, keep: impl Fn(&str) -> bool) -> Selection {
    let mut selection = Selection::default();
    for (i, record) in table.iter().enumerate() {
        if keep(record.label()) {
            selection.push(i, record);
        }
    }
    selection
}
