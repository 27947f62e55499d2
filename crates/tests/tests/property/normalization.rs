//! Property tests: percentage normalization and report formatting.
//!
//! Whatever the raw attribution scores look like, the normalized mapping
//! must sum to 100 (all-zero input stays all-zero), and the formatter must
//! emit exactly one two-decimal line per entry.

use std::collections::BTreeMap;

use causeway_agent::{format_arrow_percentages, format_node_percentages, to_percentages};
use causeway_gcm::Arrow;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_scores() -> impl Strategy<Value = BTreeMap<String, f64>> {
    prop::collection::btree_map("[a-z_]{1,12}", -1.0e6f64..1.0e6, 1..10)
}

fn arb_arrow_scores() -> impl Strategy<Value = BTreeMap<Arrow, f64>> {
    prop::collection::btree_map(
        ("[a-z]{2,8}", "[a-z]{2,8}").prop_map(|(source, target)| Arrow { source, target }),
        0.0f64..1.0e4,
        1..8,
    )
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Non-degenerate score maps normalize to percentages summing to 100.
    #[test]
    fn percentages_sum_to_one_hundred(scores in arb_scores()) {
        let total: f64 = scores.values().map(|v| v.abs()).sum();
        prop_assume!(total > 1e-9);
        let pct = to_percentages(&scores);
        let sum: f64 = pct.values().sum();
        prop_assert!((sum - 100.0).abs() < 1e-6, "sum was {sum}");
    }

    /// Every normalized value is a share: non-negative and at most 100.
    #[test]
    fn percentages_are_valid_shares(scores in arb_scores()) {
        let pct = to_percentages(&scores);
        for value in pct.values() {
            prop_assert!(*value >= 0.0);
            prop_assert!(*value <= 100.0 + 1e-9);
        }
    }

    /// Normalization never adds, drops, or renames keys.
    #[test]
    fn normalization_preserves_keys(scores in arb_scores()) {
        let pct = to_percentages(&scores);
        let before: Vec<_> = scores.keys().collect();
        let after: Vec<_> = pct.keys().collect();
        prop_assert_eq!(before, after);
    }

    /// The node formatter emits exactly one line per map entry.
    #[test]
    fn formatter_emits_one_line_per_entry(scores in arb_scores()) {
        let pct = to_percentages(&scores);
        let text = format_node_percentages(&pct);
        prop_assert_eq!(text.lines().count(), pct.len());
    }

    /// Formatted lines end in a two-decimal percentage.
    #[test]
    fn formatted_lines_carry_two_decimals(scores in arb_scores()) {
        let pct = to_percentages(&scores);
        for line in format_node_percentages(&pct).lines() {
            let tail = line.rsplit_once(": ").map(|(_, t)| t);
            prop_assert!(tail.is_some(), "line missing separator: {line}");
            let tail = tail.unwrap_or_default();
            prop_assert!(tail.ends_with('%'));
            let decimals = tail[..tail.len() - 1]
                .rsplit_once('.')
                .map(|(_, d)| d.len());
            prop_assert_eq!(decimals, Some(2));
        }
    }

    /// The pair-keyed formatter behaves the same way, one line per edge.
    #[test]
    fn arrow_formatter_emits_one_line_per_edge(scores in arb_arrow_scores()) {
        let pct = to_percentages(&scores);
        let text = format_arrow_percentages(&pct);
        prop_assert_eq!(text.lines().count(), pct.len());
        for line in text.lines() {
            prop_assert!(line.contains(" -> "), "edge line missing arrow: {line}");
        }
    }
}
