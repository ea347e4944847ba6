//! Filter assembly
//!
//! Walks the query map in order, skipping reserved keys, and turns every
//! remaining key into one or more clauses grouped under a single logical
//! operator chosen by the operator selector key.

use super::classify::classify_key;
use super::coerce::coerce;
use super::operators::{FanOut, OperatorDescriptor, OperatorTable};
use super::types::{FilterClause, FilterExpression, FilterValue, LogicalOp, QueryMap, QueryValue};
use crate::core::config::CompilerConfig;

/// `"and"` -> AND, `"or"` -> OR; absent or anything else -> AND
pub fn resolve_logical_op(value: Option<&QueryValue>) -> LogicalOp {
    match value.and_then(QueryValue::to_scalar).as_deref() {
        Some("or") => LogicalOp::Or,
        _ => LogicalOp::And,
    }
}

/// Build the filter expression for every non-reserved key of `query`
pub fn assemble_filters(
    query: &QueryMap,
    config: &CompilerConfig,
    table: &OperatorTable,
) -> FilterExpression {
    let logical = resolve_logical_op(query.get(&config.operator_key));
    let mut clauses = Vec::new();

    for (key, raw) in query.iter() {
        if config.is_reserved(key) {
            continue;
        }

        let classified = classify_key(key, table);
        let descriptor = table.descriptor(classified.operator);
        let value = coerce(FilterValue::from(raw.clone()), descriptor.transform);
        tracing::trace!(
            key,
            field = classified.field,
            operator = %classified.operator,
            "Classified filter key"
        );

        let before = clauses.len();
        push_clauses(&mut clauses, descriptor, classified.field, value);
        tracing::trace!(key, clauses = clauses.len() - before, "Emitted filter clauses");
    }

    FilterExpression::from_clauses(logical, clauses)
}

/// Append the clauses for one coerced value, fanning arrays out when allowed
fn push_clauses(
    clauses: &mut Vec<FilterClause>,
    descriptor: &OperatorDescriptor,
    field: &str,
    value: FilterValue,
) {
    match (value, descriptor.fan_out) {
        (FilterValue::Array(items), FanOut::PerElement) => {
            clauses.extend(items.into_iter().map(|item| descriptor.build_clause(field, item)));
        }
        (value, _) => clauses.push(descriptor.build_clause(field, value)),
    }
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod tests;
