//! Rescaling of raw attribution scores into comparable percentages.

use std::collections::BTreeMap;

/// Convert raw scores to percentages of total absolute magnitude.
///
/// Each value becomes `|v| / sum(|v|) * 100`, so the result always sums to
/// 100 (up to rounding) regardless of the sign or scale of the inputs. An
/// empty map or a map of all zeros normalizes to zeros instead of NaN.
pub fn to_percentages<K>(values: &BTreeMap<K, f64>) -> BTreeMap<K, f64>
where
    K: Ord + Clone,
{
    let total: f64 = values.values().map(|v| v.abs()).sum();
    values
        .iter()
        .map(|(key, value)| {
            let pct = if total > 0.0 {
                value.abs() / total * 100.0
            } else {
                0.0
            };
            (key.clone(), pct)
        })
        .collect()
}
