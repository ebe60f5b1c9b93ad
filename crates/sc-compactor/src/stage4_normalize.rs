//! Stage 4: Normalize — hard length cap, fragment and cost accounting.

use regex::Regex;
use sc_core::types::is_english;
use std::sync::LazyLock;

/// Characters per billed SMS fragment.
pub const FRAGMENT_LEN: usize = 160;

/// Trailing characters removed after a hard cut.
pub const CUT_TRIM: &[char] = &['.', ' ', ','];

static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\[\]]+\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOutput {
    pub text: String,
    pub length: usize,
    pub fragments: usize,
    pub truncated: bool,
}

/// Length in Unicode scalar values.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Billed fragments for `text`; never less than one.
pub fn sms_fragments(text: &str) -> usize {
    fragments_for_len(char_len(text))
}

pub fn fragments_for_len(len: usize) -> usize {
    ((len + FRAGMENT_LEN - 1) / FRAGMENT_LEN).max(1)
}

/// Cut `text` to `max_chars` characters and drop dangling `.`, ` ` and `,`.
/// Text already within the limit is returned unchanged.
pub fn enforce_limit(text: &str, max_chars: usize) -> (String, bool) {
    if char_len(text) <= max_chars {
        return (text.to_string(), false);
    }
    let cut: String = text.chars().take(max_chars).collect();
    (cut.trim_end_matches(CUT_TRIM).to_string(), true)
}

/// Apply the length policy. Translated output is never cut.
pub fn normalize(candidate: &str, max_chars: usize, target_language: &str) -> NormalizedOutput {
    let (text, truncated) = if is_english(target_language) {
        enforce_limit(candidate, max_chars)
    } else {
        (candidate.to_string(), false)
    };
    let length = char_len(&text);
    NormalizedOutput { fragments: fragments_for_len(length), text, length, truncated }
}

/// Savings from sending fewer fragments; zero when the count did not drop.
pub fn cost_savings(original_fragments: usize, final_fragments: usize, cost_per_fragment: f64) -> f64 {
    original_fragments.saturating_sub(final_fragments) as f64 * cost_per_fragment.max(0.0)
}

pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bracketed placeholders present in `original` but missing from `output`.
pub fn lost_placeholders<'a>(original: &'a str, output: &str) -> Vec<&'a str> {
    let mut lost: Vec<&str> = RE_PLACEHOLDER
        .find_iter(original)
        .map(|m| m.as_str())
        .filter(|p| !output.contains(p))
        .collect();
    lost.sort_unstable();
    lost.dedup();
    lost
}
