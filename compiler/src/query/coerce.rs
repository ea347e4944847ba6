//! Value coercion
//!
//! Raw query strings become typed [`FilterValue`]s in two phases:
//!
//! 1. The operator's transform (if any) reshapes the raw value.
//! 2. Generic coercion walks the result, recursing through arrays, and tries
//!    each entry of [`MATCHERS`] in priority order against every string.
//!
//! Nothing here fails: a string no matcher accepts is returned unchanged.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use super::operators::ValueTransform;
use super::types::FilterValue;
use crate::core::constants::{FALSE_LITERAL, NULL_LITERAL, TRUE_LITERAL};
use crate::utils::string::split_list;
use crate::utils::time::date_to_utc_midnight;

/// Typed matcher: returns a value when it recognizes the whole string
pub type Matcher = fn(&str) -> Option<FilterValue>;

/// Generic matchers, highest priority first
pub const MATCHERS: &[(&str, Matcher)] = &[
    ("null", match_null),
    ("boolean", match_boolean),
    ("timestamp", match_timestamp),
    ("date", match_calendar_date),
];

/// Apply the operator transform, then generic coercion
pub fn coerce(value: FilterValue, transform: Option<ValueTransform>) -> FilterValue {
    let value = match transform {
        Some(transform) => transform(value),
        None => value,
    };
    coerce_generic(value)
}

/// Generic coercion, element-wise through arrays
pub fn coerce_generic(value: FilterValue) -> FilterValue {
    match value {
        FilterValue::String(raw) => coerce_scalar(raw),
        FilterValue::Array(items) => {
            FilterValue::Array(items.into_iter().map(coerce_generic).collect())
        }
        other => other,
    }
}

/// First matching typed value, or the original string
pub fn coerce_scalar(raw: String) -> FilterValue {
    MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(&raw))
        .unwrap_or(FilterValue::String(raw))
}

fn match_null(raw: &str) -> Option<FilterValue> {
    (raw == NULL_LITERAL).then_some(FilterValue::Null)
}

fn match_boolean(raw: &str) -> Option<FilterValue> {
    match raw {
        TRUE_LITERAL => Some(FilterValue::Bool(true)),
        FALSE_LITERAL => Some(FilterValue::Bool(false)),
        _ => None,
    }
}

/// Strict ISO 8601 instant: date, time with seconds, and an explicit offset
fn match_timestamp(raw: &str) -> Option<FilterValue> {
    static RE_TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    let re = RE_TIMESTAMP.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
            .expect("Invalid regex")
    });
    if !re.is_match(raw) {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| FilterValue::Date(dt.with_timezone(&Utc)))
}

/// Bare calendar date (`YYYY-MM-DD`) at UTC midnight
fn match_calendar_date(raw: &str) -> Option<FilterValue> {
    static RE_DATE: OnceLock<Regex> = OnceLock::new();
    let re = RE_DATE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid regex"));
    if !re.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| FilterValue::Date(date_to_utc_midnight(date)))
}

// ============================================================================
// Operator transforms
// ============================================================================

/// `in`: split a comma-separated string into an array; arrays pass through
pub fn split_list_value(value: FilterValue) -> FilterValue {
    match value {
        FilterValue::String(raw) => {
            FilterValue::Array(split_list(&raw).into_iter().map(FilterValue::String).collect())
        }
        other => other,
    }
}

/// `exists`: `"true"` becomes `true`, anything else `false`
pub fn exists_flag(value: FilterValue) -> FilterValue {
    match value {
        FilterValue::Array(items) => {
            FilterValue::Array(items.into_iter().map(exists_flag).collect())
        }
        FilterValue::String(raw) => FilterValue::Bool(raw == TRUE_LITERAL),
        FilterValue::Bool(flag) => FilterValue::Bool(flag),
        _ => FilterValue::Bool(false),
    }
}

/// `eqInt`: base-10 integer, or the original string when it does not parse
pub fn parse_integer(value: FilterValue) -> FilterValue {
    match value {
        FilterValue::Array(items) => {
            FilterValue::Array(items.into_iter().map(parse_integer).collect())
        }
        FilterValue::String(raw) => match raw.trim().parse::<i64>() {
            Ok(number) => FilterValue::Int(number),
            Err(_) => FilterValue::String(raw),
        },
        other => other,
    }
}
