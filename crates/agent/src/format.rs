//! Plain-text rendering of attribution results.

use std::collections::BTreeMap;
use std::fmt::Display;

use causeway_gcm::{Arrow, EffectPair};

/// One `key: value%` line per entry, two decimals, no trailing newline.
fn percentage_lines<K: Display>(percentages: &BTreeMap<K, f64>) -> String {
    percentages
        .iter()
        .map(|(key, pct)| format!("{key}: {pct:.2}%"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format edge-keyed percentages, one `source -> target: pct%` line each.
pub fn format_arrow_percentages(percentages: &BTreeMap<Arrow, f64>) -> String {
    percentage_lines(percentages)
}

/// Format node-keyed percentages, one `node: pct%` line each.
pub fn format_node_percentages(percentages: &BTreeMap<String, f64>) -> String {
    percentage_lines(percentages)
}

/// Format average causal effects, `unavailable` for suppressed estimates.
pub fn format_effect_lines(effects: &BTreeMap<EffectPair, Option<f64>>) -> String {
    effects
        .iter()
        .map(|(pair, effect)| match effect {
            Some(value) => format!("{pair}: {value:.2}"),
            None => format!("{pair}: unavailable"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the full human-readable report body.
pub fn build_summary(
    target: &str,
    arrow_pct: &BTreeMap<Arrow, f64>,
    node_pct: &BTreeMap<String, f64>,
    effects: &BTreeMap<EffectPair, Option<f64>>,
) -> String {
    let mut sections = vec![
        format!("Causal attribution for {target}"),
        format!(
            "Arrow strength (% of total):\n{}",
            format_arrow_percentages(arrow_pct)
        ),
        format!(
            "Intrinsic influence (% of total):\n{}",
            format_node_percentages(node_pct)
        ),
    ];
    if !effects.is_empty() {
        sections.push(format!(
            "Average causal effects:\n{}",
            format_effect_lines(effects)
        ));
    }
    sections.join("\n\n")
}
