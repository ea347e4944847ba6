//! Key classification
//!
//! Splits a query key into a field path and an operator tag. A field path
//! whose last segment happens to equal an operator tag cannot be told apart
//! from an explicit operator suffix; the suffix reading always wins.

use super::operators::{OperatorTable, OperatorTag};
use crate::core::constants::PATH_SEPARATOR;

/// Field path and operator resolved from one query key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedKey<'a> {
    pub field: &'a str,
    pub operator: OperatorTag,
}

/// Classify `key`, defaulting to `eq` when the last segment is not an operator
pub fn classify_key<'a>(key: &'a str, table: &OperatorTable) -> ClassifiedKey<'a> {
    let (field, last) = match key.rsplit_once(PATH_SEPARATOR) {
        Some((field, last)) => (field, last),
        None => ("", key),
    };

    match table.lookup(last) {
        Some(descriptor) => ClassifiedKey {
            field,
            operator: descriptor.tag,
        },
        None => ClassifiedKey {
            field: key,
            operator: OperatorTag::Eq,
        },
    }
}
