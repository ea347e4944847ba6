//! Query compilation types
//!
//! Defines the raw query map consumed by the compiler and the typed output
//! shapes handed to the document-database driver: filter values, clauses,
//! the grouped filter expression, pagination, sort and projection.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::constants::{LIST_SEPARATOR, NULL_LITERAL};
use crate::utils::time::to_iso_millis;

// ============================================================================
// Input
// ============================================================================

/// Error building a [`QueryMap`] from JSON
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryMapError {
    /// Top-level value is not a JSON object
    #[error("Query map must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Value is an object or an array containing arrays/objects
    #[error("Unsupported value for key '{key}': expected a scalar or an array of scalars")]
    UnsupportedValue { key: String },
}

/// Raw query parameter value: one string, several when the key was repeated,
/// or an explicit JSON `null`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Null,
    Single(String),
    Multiple(Vec<String>),
}

impl QueryValue {
    /// Scalar view of the value; multiple values are joined with commas.
    ///
    /// `None` for an explicit `null`, which reserved keys treat as absent.
    pub fn to_scalar(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Single(s) => Some(s.clone()),
            Self::Multiple(v) => Some(v.join(&LIST_SEPARATOR.to_string())),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Null => *self = Self::Multiple(vec![NULL_LITERAL.to_string(), value]),
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(v) => v.push(value),
        }
    }

    /// Build from a JSON scalar or array of scalars (scalars are stringified)
    fn from_json(key: &str, value: JsonValue) -> Result<Self, QueryMapError> {
        let unsupported = || QueryMapError::UnsupportedValue {
            key: key.to_string(),
        };
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| scalar_to_string(item).ok_or_else(unsupported))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Multiple),
            other => scalar_to_string(other)
                .map(Self::Single)
                .ok_or_else(unsupported),
        }
    }
}

/// Array elements keep `null` as the literal string, which coerces back to null
fn scalar_to_string(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => Some(NULL_LITERAL.to_string()),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// Insertion-ordered mapping from query key to raw value.
///
/// Never mutated by the compiler; iteration order is the order keys were
/// first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct QueryMap {
    entries: IndexMap<String, QueryValue>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Add one occurrence of `key`; repeated keys accumulate into a multi-value
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        match self.entries.entry(key.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value.into()),
            Entry::Vacant(entry) => {
                entry.insert(QueryValue::Single(value.into()));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    /// Scalar view of `key`; `None` when absent or an explicit `null`
    pub fn scalar(&self, key: &str) -> Option<String> {
        self.get(key).and_then(QueryValue::to_scalar)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.append(key, value);
        }
        map
    }
}

impl TryFrom<JsonValue> for QueryMap {
    type Error = QueryMapError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        let object = match value {
            JsonValue::Object(object) => object,
            JsonValue::Null => return Err(QueryMapError::NotAnObject("null")),
            JsonValue::Bool(_) => return Err(QueryMapError::NotAnObject("boolean")),
            JsonValue::Number(_) => return Err(QueryMapError::NotAnObject("number")),
            JsonValue::String(_) => return Err(QueryMapError::NotAnObject("string")),
            JsonValue::Array(_) => return Err(QueryMapError::NotAnObject("array")),
        };

        let mut entries = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            let value = QueryValue::from_json(&key, value)?;
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }
}

// ============================================================================
// Filter values and clauses
// ============================================================================

/// Coerced, typed filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Date(DateTime<Utc>),
    String(String),
    Array(Vec<FilterValue>),
}

impl FilterValue {
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<QueryValue> for FilterValue {
    fn from(value: QueryValue) -> Self {
        match value {
            QueryValue::Null => Self::Null,
            QueryValue::Single(s) => Self::String(s),
            QueryValue::Multiple(v) => Self::Array(v.into_iter().map(Self::String).collect()),
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Date(dt) => serializer.serialize_str(&to_iso_millis(dt)),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => serializer.collect_seq(items),
        }
    }
}

/// One field-scoped predicate: `{ field: { symbol: value, ... } }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    field: String,
    predicate: Vec<(&'static str, FilterValue)>,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, predicate: Vec<(&'static str, FilterValue)>) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    /// Value stored under a wire symbol, e.g. `$eq`
    pub fn get(&self, symbol: &str) -> Option<&FilterValue> {
        self.predicate
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, value)| value)
    }
}

struct Predicate<'a>(&'a [(&'static str, FilterValue)]);

impl Serialize for Predicate<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (symbol, value) in self.0 {
            map.serialize_entry(symbol, value)?;
        }
        map.end()
    }
}

impl Serialize for FilterClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &Predicate(&self.predicate))?;
        map.end()
    }
}

/// Logical operator grouping every clause of one compilation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "and"),
            LogicalOp::Or => write!(f, "or"),
        }
    }
}

/// Full filter expression: `{}` or `{ "$and" | "$or": [clauses...] }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterExpression {
    #[default]
    Empty,
    Group {
        logical: LogicalOp,
        clauses: Vec<FilterClause>,
    },
}

impl FilterExpression {
    /// Group `clauses` under `logical`, or `Empty` when there are none
    pub fn from_clauses(logical: LogicalOp, clauses: Vec<FilterClause>) -> Self {
        if clauses.is_empty() {
            Self::Empty
        } else {
            Self::Group { logical, clauses }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn logical(&self) -> Option<LogicalOp> {
        match self {
            Self::Empty => None,
            Self::Group { logical, .. } => Some(*logical),
        }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        match self {
            Self::Empty => &[],
            Self::Group { clauses, .. } => clauses,
        }
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_map(Some(0))?.end(),
            Self::Group { logical, clauses } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(logical.symbol(), clauses)?;
                map.end()
            }
        }
    }
}

// ============================================================================
// Pagination, sort and projection
// ============================================================================

/// Pagination window.
///
/// Values are kept as `f64` so non-numeric input surfaces as `NaN` instead of
/// being replaced by a default. Integral values serialize as JSON integers;
/// `NaN` serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub limit: f64,
    pub offset: f64,
}

impl Pagination {
    /// Integer `(limit, offset)` when both are finite, non-negative integers
    pub fn window(&self) -> Option<(u64, u64)> {
        Some((as_whole_number(self.limit)?, as_whole_number(self.offset)?))
    }
}

fn as_whole_number(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

struct JsNumber(f64);

impl Serialize for JsNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

impl Serialize for Pagination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("limit", &JsNumber(self.limit))?;
        map.serialize_entry("offset", &JsNumber(self.offset))?;
        map.end()
    }
}

/// Sort direction, serialized as `1` / `-1`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn value(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.value())
    }
}

/// Ordered field -> direction mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    terms: IndexMap<String, SortDirection>,
}

impl SortSpec {
    /// Set the direction for `field`; a repeated field keeps its first position
    pub fn set(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.terms.insert(field.into(), direction);
    }

    pub fn get(&self, field: &str) -> Option<SortDirection> {
        self.terms.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.terms.iter().map(|(f, d)| (f.as_str(), *d))
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.terms)
    }
}

/// Ordered set of included fields, serialized as `{ field: 1, ... }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: IndexSet<String>,
}

impl Projection {
    /// Include `field`; repeated fields are ignored
    pub fn include(&mut self, field: impl Into<String>) {
        self.fields.insert(field.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|field| (field, 1)))
    }
}

/// Compiled query handed to the data-access layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub filters: FilterExpression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Projection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_query_map_from_json_preserves_order() {
        let map = QueryMap::try_from(json!({ "b": "1", "a": "2", "c": ["x", "y"] })).unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(map.get("c"), Some(&QueryValue::from(vec!["x", "y"])));
    }

    #[test]
    fn test_query_map_from_json_stringifies_scalars() {
        let map =
            QueryMap::try_from(json!({ "page": 2, "flag": true, "tags": ["a", null] })).unwrap();
        assert_eq!(map.get("page"), Some(&QueryValue::from("2")));
        assert_eq!(map.get("flag"), Some(&QueryValue::from("true")));
        assert_eq!(map.get("tags"), Some(&QueryValue::from(vec!["a", "null"])));
    }

    #[test]
    fn test_query_map_from_json_keeps_explicit_null() {
        let map = QueryMap::try_from(json!({ "limit": null, "x": "null" })).unwrap();
        assert_eq!(map.get("limit"), Some(&QueryValue::Null));
        assert_eq!(map.scalar("limit"), None);
        assert_eq!(map.scalar("x"), Some("null".to_string()));
        assert_eq!(FilterValue::from(QueryValue::Null), FilterValue::Null);
    }

    #[test]
    fn test_query_map_from_json_rejects_non_object() {
        assert_eq!(
            QueryMap::try_from(json!(["a"])),
            Err(QueryMapError::NotAnObject("array"))
        );
    }

    #[test]
    fn test_query_map_from_json_rejects_nested_object() {
        assert_eq!(
            QueryMap::try_from(json!({ "a": { "b": "c" } })),
            Err(QueryMapError::UnsupportedValue {
                key: "a".to_string()
            })
        );
    }

    #[test]
    fn test_query_map_deserialize() {
        let map: QueryMap = serde_json::from_str(r#"{"name.eq": "John", "page": 1}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("name.eq"), Some(&QueryValue::from("John")));
    }

    #[test]
    fn test_query_map_append_merges_repeated_keys() {
        let map: QueryMap = [("status", "open"), ("name", "x"), ("status", "closed")]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("status"),
            Some(&QueryValue::from(vec!["open", "closed"]))
        );
        assert_eq!(map.iter().next().map(|(k, _)| k), Some("status"));
    }

    #[test]
    fn test_query_map_insert_replaces_in_place() {
        let mut map = QueryMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        map.insert("a", "3");
        let entries: Vec<(&str, Option<String>)> =
            map.iter().map(|(k, v)| (k, v.to_scalar())).collect();
        assert_eq!(
            entries,
            vec![("a", Some("3".to_string())), ("b", Some("2".to_string()))]
        );
    }

    #[test]
    fn test_query_map_collects_many_keys() {
        let count = 100_000;
        let map: QueryMap = (0..count)
            .map(|i| (format!("f{}", i), "v"))
            .chain([("f0".to_string(), "w")])
            .collect();
        assert_eq!(map.len(), count);
        assert_eq!(map.iter().next().map(|(k, _)| k), Some("f0"));
        assert_eq!(map.get("f0"), Some(&QueryValue::from(vec!["v", "w"])));
        assert_eq!(map.get("f99999"), Some(&QueryValue::from("v")));
    }

    #[test]
    fn test_query_map_append_after_null() {
        let mut map = QueryMap::try_from(json!({ "status": null })).unwrap();
        map.append("status", "open");
        assert_eq!(
            map.get("status"),
            Some(&QueryValue::from(vec!["null", "open"]))
        );
    }

    #[test]
    fn test_query_value_to_scalar_joins() {
        assert_eq!(
            QueryValue::from(vec!["A", "B"]).to_scalar(),
            Some("A,B".to_string())
        );
        assert_eq!(QueryValue::Null.to_scalar(), None);
    }

    #[test]
    fn test_filter_value_serialize() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let value = FilterValue::Array(vec![
            FilterValue::Null,
            FilterValue::Bool(true),
            FilterValue::Int(-3),
            FilterValue::Date(dt),
            FilterValue::from("x"),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!([null, true, -3, "2024-01-15T00:00:00.000Z", "x"])
        );
    }

    #[test]
    fn test_filter_clause_serialize_keeps_predicate_order() {
        let clause = FilterClause::new(
            "Person.firstName",
            vec![("$regex", "oh".into()), ("$options", "i".into())],
        );
        assert_eq!(
            serde_json::to_string(&clause).unwrap(),
            r#"{"Person.firstName":{"$regex":"oh","$options":"i"}}"#
        );
        assert_eq!(clause.get("$options"), Some(&FilterValue::from("i")));
    }

    #[test]
    fn test_filter_expression_serialize() {
        assert_eq!(
            serde_json::to_value(FilterExpression::Empty).unwrap(),
            json!({})
        );
        let expr = FilterExpression::from_clauses(
            LogicalOp::Or,
            vec![FilterClause::new("x", vec![("$eq", FilterValue::Null)])],
        );
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({ "$or": [{ "x": { "$eq": null } }] })
        );
    }

    #[test]
    fn test_filter_expression_from_no_clauses_is_empty() {
        let expr = FilterExpression::from_clauses(LogicalOp::Or, Vec::new());
        assert!(expr.is_empty());
        assert_eq!(expr.logical(), None);
    }

    #[test]
    fn test_pagination_serialize_integral() {
        let pagination = Pagination {
            limit: 5.0,
            offset: 5.0,
        };
        assert_eq!(
            serde_json::to_string(&pagination).unwrap(),
            r#"{"limit":5,"offset":5}"#
        );
        assert_eq!(pagination.window(), Some((5, 5)));
    }

    #[test]
    fn test_pagination_nan_serializes_as_null() {
        let pagination = Pagination {
            limit: 10.0,
            offset: f64::NAN,
        };
        assert_eq!(
            serde_json::to_value(pagination).unwrap(),
            json!({ "limit": 10, "offset": null })
        );
        assert_eq!(pagination.window(), None);
    }

    #[test]
    fn test_pagination_window_rejects_fractional_and_negative() {
        let fractional = Pagination {
            limit: 2.5,
            offset: 0.0,
        };
        assert_eq!(fractional.window(), None);
        let negative = Pagination {
            limit: 10.0,
            offset: -10.0,
        };
        assert_eq!(negative.window(), None);
        assert_eq!(
            serde_json::to_value(fractional).unwrap(),
            json!({ "limit": 2.5, "offset": 0 })
        );
    }

    #[test]
    fn test_sort_spec_set_overwrites_in_place() {
        let mut sort = SortSpec::default();
        sort.set("a", SortDirection::Asc);
        sort.set("b", SortDirection::Desc);
        sort.set("a", SortDirection::Desc);
        assert_eq!(
            serde_json::to_string(&sort).unwrap(),
            r#"{"a":-1,"b":-1}"#
        );
        assert_eq!(sort.get("a"), Some(SortDirection::Desc));
    }

    #[test]
    fn test_projection_include_is_idempotent() {
        let mut projection = Projection::default();
        projection.include("B");
        projection.include("A");
        projection.include("B");
        assert_eq!(
            serde_json::to_string(&projection).unwrap(),
            r#"{"B":1,"A":1}"#
        );
        assert_eq!(projection.fields().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_compiled_query_omits_absent_parts() {
        let compiled = CompiledQuery::default();
        assert_eq!(
            serde_json::to_value(&compiled).unwrap(),
            json!({ "filters": {} })
        );
    }
}
