//! String utility functions

use crate::core::constants::LIST_SEPARATOR;

/// Split a comma-separated value, keeping every segment as written.
///
/// Empty segments and surrounding whitespace are preserved, so `"a, ,b"`
/// yields `["a", " ", "b"]`.
pub fn split_list(value: &str) -> Vec<String> {
    value.split(LIST_SEPARATOR).map(str::to_string).collect()
}

/// Split a comma-separated value and trim each segment.
///
/// Empty segments are kept (as empty strings) so callers see exactly one
/// entry per separator-delimited token.
pub fn split_list_trimmed(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(|s| s.trim().to_string())
        .collect()
}
