//! Property-based tests for trueno-decode
//!
//! Following ruchy/trueno/aprender pattern:
//! - Test mathematical invariants
//! - Test data integrity properties
//! - Run with ProptestConfig::with_cases(100)
//! - Must complete in <30 seconds for pre-commit hook

use proptest::prelude::*;
use std::collections::BTreeSet;
use trueno_decode::aggregate::{chance_level, AggregateScore, FoldOutcome, FoldScore};
use trueno_decode::folds::{group_k_fold, leave_one_run_out};
use trueno_decode::labels::LabelTable;
use trueno_decode::scoring::Scoring;
use trueno_decode::selection::select_trials;
use trueno_decode::FailureKind;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

const CATEGORIES: [&str; 5] = ["face", "house", "cat", "shoe", "rest"];

/// Label table with random categories and runs 0..6
fn arb_label_table(max_rows: usize) -> impl Strategy<Value = LabelTable> {
    proptest::collection::vec((0usize..CATEGORIES.len(), 0i64..6), 0..max_rows).prop_map(
        |rows| LabelTable::from_pairs(rows.into_iter().map(|(c, run)| (CATEGORIES[c], run))),
    )
}

/// Non-empty subset of the category vocabulary
fn arb_wanted() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(CATEGORIES.to_vec(), 1..=CATEGORIES.len())
}

/// Fold result: scored in [0, 1] or skipped
fn arb_fold_score() -> impl Strategy<Value = FoldScore> {
    prop_oneof![
        (0.0f64..=1.0).prop_map(|score| FoldOutcome::Scored { score }),
        Just(FoldOutcome::Skipped {
            kind: FailureKind::InsufficientRuns,
            reason: "no training data".to_string(),
        }),
    ]
    .prop_map(|outcome| FoldScore {
        test_runs: vec![0],
        n_train: 4,
        n_test: 2,
        predictions: Vec::new(),
        outcome,
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Trial Selection Properties
    // ========================================================================

    /// Property: selection is exactly the in-set labels, in original order
    #[test]
    fn prop_selection_matches_filter(
        table in arb_label_table(60),
        wanted in arb_wanted()
    ) {
        let sel = select_trials(&table, &wanted);
        let expected: Vec<String> = table
            .iter()
            .filter(|r| wanted.contains(&r.label()))
            .map(|r| r.label().to_string())
            .collect();
        prop_assert_eq!(&sel.labels, &expected);

        prop_assert!(sel.indices.windows(2).all(|w| w[0] < w[1]));
        for (k, &i) in sel.indices.iter().enumerate() {
            let record = table.get(i).unwrap();
            prop_assert_eq!(record.label(), sel.labels[k].as_str());
            prop_assert_eq!(record.run(), sel.runs[k]);
        }
    }

    // ========================================================================
    // Fold Partitioner Properties
    // ========================================================================

    /// Property: one fold per distinct run; test sets tile the selection
    #[test]
    fn prop_leave_one_run_out_partitions(
        runs in proptest::collection::vec(0i64..8, 0..60)
    ) {
        let folds = leave_one_run_out(&runs);
        let distinct: BTreeSet<i64> = runs.iter().copied().collect();
        prop_assert_eq!(folds.len(), distinct.len());

        let held_out: Vec<i64> = folds.iter().map(|f| f.test_runs[0]).collect();
        prop_assert_eq!(held_out, distinct.into_iter().collect::<Vec<_>>());

        let mut covered: Vec<usize> = folds.iter().flat_map(|f| f.test.iter().copied()).collect();
        covered.sort_unstable();
        prop_assert_eq!(covered, (0..runs.len()).collect::<Vec<_>>());

        for fold in &folds {
            prop_assert_eq!(fold.train.len() + fold.test.len(), runs.len());
            for &i in &fold.test {
                prop_assert_eq!(runs[i], fold.test_runs[0]);
            }
            for &i in &fold.train {
                prop_assert_ne!(runs[i], fold.test_runs[0]);
            }
        }
    }

    /// Property: grouped k-fold holds out every run exactly once
    #[test]
    fn prop_group_k_fold_holds_out_each_run_once(
        runs in proptest::collection::vec(0i64..10, 1..60),
        n_splits in 1usize..6
    ) {
        let folds = group_k_fold(&runs, n_splits).unwrap();
        let mut held_out: Vec<i64> = folds.iter().flat_map(|f| f.test_runs.iter().copied()).collect();
        held_out.sort_unstable();
        let distinct: Vec<i64> = runs.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(held_out, distinct);

        for fold in &folds {
            for &i in &fold.train {
                prop_assert!(!fold.test_runs.contains(&runs[i]));
            }
        }
    }

    // ========================================================================
    // Aggregation Properties
    // ========================================================================

    /// Property: aggregate lies in [0, 1] when defined, undefined otherwise
    #[test]
    fn prop_aggregate_bounds(
        folds in proptest::collection::vec(arb_fold_score(), 0..12)
    ) {
        let agg = AggregateScore::from_folds(&folds, 2);
        let used = folds.iter().filter(|f| f.score().is_some()).count();
        prop_assert_eq!(agg.folds_used, used);
        prop_assert_eq!(agg.folds_used + agg.folds_skipped, folds.len());

        match agg.mean {
            Some(mean) => {
                prop_assert!(used > 0);
                prop_assert!((0.0..=1.0).contains(&mean));
            }
            None => prop_assert_eq!(used, 0),
        }
    }

    /// Property: chance level is 1/k
    #[test]
    fn prop_chance_level_reciprocal(k in 1usize..50) {
        prop_assert!((chance_level(k).unwrap() * k as f64 - 1.0).abs() < 1e-12);
    }

    /// Property: accuracy is the fraction of matches
    #[test]
    fn prop_accuracy_in_unit_interval(
        pairs in proptest::collection::vec((0usize..3, 0usize..3), 1..40)
    ) {
        let truth: Vec<&str> = pairs.iter().map(|(t, _)| CATEGORIES[*t]).collect();
        let pred: Vec<&str> = pairs.iter().map(|(_, p)| CATEGORIES[*p]).collect();
        let acc = Scoring::Accuracy.score(&truth, &pred).unwrap();
        let bal = Scoring::BalancedAccuracy.score(&truth, &pred).unwrap();
        prop_assert!((0.0..=1.0).contains(&acc));
        prop_assert!((0.0..=1.0).contains(&bal));

        let matches = pairs.iter().filter(|(t, p)| t == p).count();
        prop_assert!((acc - matches as f64 / pairs.len() as f64).abs() < 1e-12);
    }
}
