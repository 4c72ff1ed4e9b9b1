//! Title similarity used to rank search hits.

use std::collections::BTreeSet;

fn title_tokens(title: &str) -> BTreeSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sørensen–Dice coefficient over normalized word sets, in 0.0 - 1.0.
///
/// Case, punctuation and word order are ignored. Two empty titles score 0.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let ta = title_tokens(a);
    let tb = title_tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    (2 * shared) as f64 / (ta.len() + tb.len()) as f64
}
