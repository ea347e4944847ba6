//! Pagination resolver

use super::types::{Pagination, QueryMap};
use crate::core::config::CompilerConfig;
use crate::core::constants::NULL_LITERAL;

/// Resolve `{ limit, offset }` from the page and limit keys.
///
/// A limit of the string `"null"` disables pagination; an explicit JSON
/// `null` counts as absent. Non-numeric page or limit values become `NaN` and
/// propagate into the window unchanged.
pub fn resolve_pagination(query: &QueryMap, config: &CompilerConfig) -> Option<Pagination> {
    let limit = query.scalar(&config.limit_key);
    if limit.as_deref() == Some(NULL_LITERAL) {
        tracing::trace!("Pagination disabled by null limit");
        return None;
    }

    let page = query.scalar(&config.page_key);
    let page = parse_number(page.as_deref(), config.default_page);
    let page_size = parse_number(limit.as_deref(), config.default_limit);

    Some(Pagination {
        limit: page_size,
        offset: (page - 1.0) * page_size,
    })
}

/// Permissive numeric parse: missing or empty uses the default,
/// whitespace-only is zero, anything unparseable is `NaN`
fn parse_number(raw: Option<&str>, default: u64) -> f64 {
    match raw {
        None | Some("") => default as f64,
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                parse_numeric_literal(trimmed)
            }
        }
    }
}

/// Numeric string grammar of JavaScript's `Number()`: signed decimals with
/// exponents, `Infinity`, and unsigned `0x` / `0o` / `0b` integers.
/// Spellings such as `inf` or `nan` are not numbers.
fn parse_numeric_literal(text: &str) -> f64 {
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&text[2..], radix);
    }

    if text
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
    {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| {
            c.to_digit(radix)
                .map(|digit| acc * f64::from(radix) + f64::from(digit))
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginate(pairs: &[(&str, &str)]) -> Option<Pagination> {
        let query: QueryMap = pairs.iter().copied().collect();
        resolve_pagination(&query, &CompilerConfig::default())
    }

    #[test]
    fn test_selects_pagination() {
        assert_eq!(
            paginate(&[("page", "1"), ("limit", "2")]),
            Some(Pagination {
                limit: 2.0,
                offset: 0.0
            })
        );
    }

    #[test]
    fn test_calculates_page_offset() {
        assert_eq!(
            paginate(&[("page", "2"), ("limit", "5")]),
            Some(Pagination {
                limit: 5.0,
                offset: 5.0
            })
        );
    }

    #[test]
    fn test_paginates_by_default() {
        assert_eq!(
            paginate(&[]),
            Some(Pagination {
                limit: 10.0,
                offset: 0.0
            })
        );
    }

    #[test]
    fn test_null_limit_disables_pagination() {
        assert_eq!(paginate(&[("page", "1"), ("limit", "null")]), None);
    }

    #[test]
    fn test_empty_values_use_defaults() {
        assert_eq!(
            paginate(&[("page", ""), ("limit", "")]),
            Some(Pagination {
                limit: 10.0,
                offset: 0.0
            })
        );
    }

    #[test]
    fn test_custom_defaults() {
        let config = CompilerConfig {
            default_page: 3,
            default_limit: 20,
            ..Default::default()
        };
        let pagination = resolve_pagination(&QueryMap::new(), &config).unwrap();
        assert_eq!(pagination.window(), Some((20, 40)));
    }

    #[test]
    fn test_non_numeric_page_propagates_nan() {
        let pagination = paginate(&[("page", "abc"), ("limit", "5")]).unwrap();
        assert_eq!(pagination.limit, 5.0);
        assert!(pagination.offset.is_nan());
        assert_eq!(pagination.window(), None);
    }

    #[test]
    fn test_non_numeric_limit_propagates_nan() {
        let pagination = paginate(&[("limit", "ten")]).unwrap();
        assert!(pagination.limit.is_nan());
        assert!(pagination.offset.is_nan());
    }

    #[test]
    fn test_repeated_page_key_is_not_a_number() {
        let pagination = paginate(&[("page", "1"), ("page", "2")]).unwrap();
        assert!(pagination.offset.is_nan());
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(
            paginate(&[("page", " 3 "), ("limit", "4")]).and_then(|p| p.window()),
            Some((4, 8))
        );
    }

    #[test]
    fn test_json_null_limit_uses_default() {
        let query = QueryMap::try_from(serde_json::json!({ "page": null, "limit": null })).unwrap();
        assert_eq!(
            resolve_pagination(&query, &CompilerConfig::default()),
            Some(Pagination {
                limit: 10.0,
                offset: 0.0
            })
        );
    }

    #[test]
    fn test_numeric_literal_grammar() {
        assert_eq!(parse_numeric_literal("1e3"), 1000.0);
        assert_eq!(parse_numeric_literal("+.5"), 0.5);
        assert_eq!(parse_numeric_literal("0x10"), 16.0);
        assert_eq!(parse_numeric_literal("0O17"), 15.0);
        assert_eq!(parse_numeric_literal("0b101"), 5.0);
        assert_eq!(parse_numeric_literal("Infinity"), f64::INFINITY);
        assert_eq!(parse_numeric_literal("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_non_numeric_spellings_are_nan() {
        for text in ["inf", "infinity", "INF", "nan", "NaN", "-0x10", "0x", "0x1g", "1e", "12px"] {
            assert!(parse_numeric_literal(text).is_nan(), "{}", text);
        }
    }

    #[test]
    fn test_hex_limit() {
        assert_eq!(
            paginate(&[("page", "2"), ("limit", "0x10")]).and_then(|p| p.window()),
            Some((16, 16))
        );
    }

    #[test]
    fn test_page_zero_gives_negative_offset() {
        let pagination = paginate(&[("page", "0"), ("limit", "10")]).unwrap();
        assert_eq!(pagination.offset, -10.0);
    }
}
