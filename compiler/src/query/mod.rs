//! Query map compiler
//!
//! Turns a flat, string-keyed query-parameter map into the parts of a
//! document-database query: a filter expression, a pagination window, a sort
//! specification and a projection mask.
//!
//! ## Usage
//!
//! ```
//! use docquery_compiler::query::{compile, QueryMap};
//!
//! let query: QueryMap = [("Person.firstName.contains", "jo"), ("sort", "Age DESC")]
//!     .into_iter()
//!     .collect();
//! let compiled = compile(&query);
//!
//! assert_eq!(
//!     serde_json::to_value(&compiled).unwrap(),
//!     serde_json::json!({
//!         "pagination": { "limit": 10, "offset": 0 },
//!         "filters": { "$and": [{ "Person.firstName": { "$regex": "jo", "$options": "i" } }] },
//!         "sort": { "Age": -1 }
//!     })
//! );
//! ```

mod classify;
mod coerce;
mod compiler;
mod filters;
mod operators;
mod pagination;
mod projection;
mod sort;
mod types;

pub use classify::{ClassifiedKey, classify_key};
pub use coerce::{MATCHERS, Matcher, coerce, coerce_generic, coerce_scalar};
pub use compiler::{QueryCompiler, compile};
pub use filters::{assemble_filters, resolve_logical_op};
pub use operators::{
    ClauseBuilder, FanOut, OperatorDescriptor, OperatorTable, OperatorTag, ValueTransform,
};
pub use pagination::resolve_pagination;
pub use projection::resolve_projection;
pub use sort::{parse_sort_term, resolve_sort};
pub use types::{
    CompiledQuery, FilterClause, FilterExpression, FilterValue, LogicalOp, Pagination,
    Projection, QueryMap, QueryMapError, QueryValue, SortDirection, SortSpec,
};
