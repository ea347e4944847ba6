//! Sort resolver
//!
//! `sort=OrderId DESC, Name` becomes `{ OrderId: -1, Name: 1 }`.

use std::sync::OnceLock;

use regex::Regex;

use super::types::{QueryMap, SortDirection, SortSpec};
use crate::core::config::CompilerConfig;
use crate::core::constants::LIST_SEPARATOR;

/// Resolve the sort specification, or `None` when the sort key is absent or empty
pub fn resolve_sort(query: &QueryMap, config: &CompilerConfig) -> Option<SortSpec> {
    let raw = query.scalar(&config.sort_key)?;
    if raw.is_empty() {
        return None;
    }

    let mut sort = SortSpec::default();
    for term in raw.split(LIST_SEPARATOR) {
        let (field, direction) = parse_sort_term(term);
        sort.set(field, direction);
    }
    Some(sort)
}

/// Parse `<field>[ ASC|DESC]`; the direction keyword is case-insensitive
pub fn parse_sort_term(term: &str) -> (&str, SortDirection) {
    static RE_SORT_TERM: OnceLock<Regex> = OnceLock::new();
    let re = RE_SORT_TERM
        .get_or_init(|| Regex::new(r"^(.*?)(?:\s((?i:ASC|DESC)))?$").expect("Invalid regex"));

    let term = term.trim();
    let Some(caps) = re.captures(term) else {
        return (term, SortDirection::Asc);
    };

    let field = caps.get(1).map_or("", |m| m.as_str()).trim();
    let direction = match caps.get(2) {
        Some(m) if m.as_str().eq_ignore_ascii_case("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    (field, direction)
}
