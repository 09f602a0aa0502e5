//! # Text Normalizer Module
//!
//! Canonicalizes raw ingredient substrings before they are looked up in the
//! alias map. Normalization is pure: the same input always yields the same output,
//! and normalizing an already normalized string leaves it unchanged.

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

lazy_static! {
    static ref APOSTROPHE_VARIANTS: Regex =
        Regex::new(r"[\u{2018}\u{2019}\u{02BC}']").expect("Apostrophe pattern should be valid");
    static ref DISALLOWED_CHARS: Regex =
        Regex::new(r"[^0-9a-zA-Z\-+() %]").expect("Disallowed character pattern should be valid");
    static ref WHITESPACE_RUNS: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}

/// Normalize a raw ingredient token for matching
///
/// Apostrophe variants are canonicalized, every character other than ASCII letters,
/// digits, space, `-`, `+`, `(`, `)` and `%` becomes a space, whitespace runs are
/// collapsed, and the result is trimmed and lower-cased.
///
/// # Examples
///
/// ```rust
/// use bite_right::normalizer::normalize_token;
///
/// assert_eq!(normalize_token("  Sodium   Benzoate. "), "sodium benzoate");
/// assert_eq!(normalize_token("Citric Acid (E330)"), "citric acid (e330)");
/// ```
pub fn normalize_token(raw: &str) -> String {
    let canonical = APOSTROPHE_VARIANTS.replace_all(raw, "'");
    let stripped = DISALLOWED_CHARS.replace_all(&canonical, " ");
    let collapsed = WHITESPACE_RUNS.replace_all(&stripped, " ");
    let normalized = collapsed.trim().to_lowercase();

    trace!("Normalized token: '{}' -> '{}'", raw, normalized);
    normalized
}
