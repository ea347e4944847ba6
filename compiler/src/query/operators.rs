//! Filter operator vocabulary
//!
//! Each operator tag (the trailing key segment, e.g. `contains` in
//! `Person.firstName.contains`) maps to an immutable [`OperatorDescriptor`].
//! The table is built once per process and only read afterwards.
//!
//! | Tag        | Wire symbol | Extra options   | Transform         | Fan-out |
//! |------------|-------------|-----------------|-------------------|---------|
//! | `eq`       | `$eq`       | -               | -                 | yes     |
//! | `ne`       | `$ne`       | -               | -                 | yes     |
//! | `contains` | `$regex`    | `$options: "i"` | -                 | yes     |
//! | `lt`       | `$lt`       | -               | -                 | yes     |
//! | `lte`      | `$lte`      | -               | -                 | yes     |
//! | `gt`       | `$gt`       | -               | -                 | yes     |
//! | `gte`      | `$gte`      | -               | -                 | yes     |
//! | `in`       | `$in`       | -               | split on commas   | no      |
//! | `exists`   | `$exists`   | -               | `"true"` -> true  | yes     |
//! | `eqInt`    | `$eq`       | -               | parse integer     | yes     |
//! | `eqDate`   | (range)     | -               | -                 | yes     |

use std::fmt;
use std::sync::LazyLock;

use super::coerce::{exists_flag, parse_integer, split_list_value};
use super::types::{FilterClause, FilterValue};
use crate::utils::time::utc_day_bounds;

/// Supported operator tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorTag {
    Eq,
    Ne,
    Contains,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Exists,
    EqInt,
    EqDate,
}

impl OperatorTag {
    pub const ALL: [OperatorTag; 11] = [
        Self::Eq,
        Self::Ne,
        Self::Contains,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::In,
        Self::Exists,
        Self::EqInt,
        Self::EqDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Contains => "contains",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::In => "in",
            Self::Exists => "exists",
            Self::EqInt => "eqInt",
            Self::EqDate => "eqDate",
        }
    }
}

impl fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-specific value transform, applied before generic coercion
pub type ValueTransform = fn(FilterValue) -> FilterValue;

/// Replaces the default `{ symbol: value }` clause shape
pub type ClauseBuilder = fn(&OperatorDescriptor, &str, FilterValue) -> FilterClause;

/// How an array-valued input is turned into clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// One sibling clause per element
    PerElement,
    /// The array is kept as a single value (membership list)
    WholeValue,
}

/// Static description of how one operator compiles into a clause
#[derive(Debug)]
pub struct OperatorDescriptor {
    pub tag: OperatorTag,
    /// Wire symbol for the default clause shape
    pub symbol: &'static str,
    /// Fixed options merged into every clause after the operator entry
    pub options: &'static [(&'static str, &'static str)],
    pub transform: Option<ValueTransform>,
    pub clause_builder: Option<ClauseBuilder>,
    pub fan_out: FanOut,
}

impl OperatorDescriptor {
    const fn simple(tag: OperatorTag, symbol: &'static str) -> Self {
        Self {
            tag,
            symbol,
            options: &[],
            transform: None,
            clause_builder: None,
            fan_out: FanOut::PerElement,
        }
    }

    fn for_tag(tag: OperatorTag) -> Self {
        match tag {
            OperatorTag::Eq => Self::simple(tag, "$eq"),
            OperatorTag::Ne => Self::simple(tag, "$ne"),
            OperatorTag::Contains => Self {
                options: &[("$options", "i")],
                ..Self::simple(tag, "$regex")
            },
            OperatorTag::Lt => Self::simple(tag, "$lt"),
            OperatorTag::Lte => Self::simple(tag, "$lte"),
            OperatorTag::Gt => Self::simple(tag, "$gt"),
            OperatorTag::Gte => Self::simple(tag, "$gte"),
            OperatorTag::In => Self {
                transform: Some(split_list_value),
                fan_out: FanOut::WholeValue,
                ..Self::simple(tag, "$in")
            },
            OperatorTag::Exists => Self {
                transform: Some(exists_flag),
                ..Self::simple(tag, "$exists")
            },
            OperatorTag::EqInt => Self {
                transform: Some(parse_integer),
                ..Self::simple(tag, "$eq")
            },
            // "$eq" is only used when the value is not a date
            OperatorTag::EqDate => Self {
                clause_builder: Some(utc_day_range_clause),
                ..Self::simple(tag, "$eq")
            },
        }
    }

    /// Build the clause for one (already coerced) value
    pub fn build_clause(&self, field: &str, value: FilterValue) -> FilterClause {
        match self.clause_builder {
            Some(builder) => builder(self, field, value),
            None => self.default_clause(field, value),
        }
    }

    /// `{ field: { symbol: value, ...options } }`
    pub fn default_clause(&self, field: &str, value: FilterValue) -> FilterClause {
        let mut predicate = Vec::with_capacity(1 + self.options.len());
        predicate.push((self.symbol, value));
        predicate.extend(
            self.options
                .iter()
                .map(|(key, option)| (*key, FilterValue::from(*option))),
        );
        FilterClause::new(field, predicate)
    }
}

/// Half-open UTC day range around a date: `{ $gte: start, $lt: next day }`.
///
/// Values that are not dates fall back to the default clause shape.
fn utc_day_range_clause(
    descriptor: &OperatorDescriptor,
    field: &str,
    value: FilterValue,
) -> FilterClause {
    match value.as_date().and_then(utc_day_bounds) {
        Some((start, end)) => FilterClause::new(
            field,
            vec![
                ("$gte", FilterValue::Date(start)),
                ("$lt", FilterValue::Date(end)),
            ],
        ),
        None => descriptor.default_clause(field, value),
    }
}

/// Ordered lookup from tag string to descriptor
#[derive(Debug)]
pub struct OperatorTable {
    descriptors: Vec<OperatorDescriptor>,
}

static OPERATOR_TABLE: LazyLock<OperatorTable> = LazyLock::new(OperatorTable::build);

impl OperatorTable {
    fn build() -> Self {
        Self {
            descriptors: OperatorTag::ALL
                .into_iter()
                .map(OperatorDescriptor::for_tag)
                .collect(),
        }
    }

    /// Process-wide table
    pub fn global() -> &'static OperatorTable {
        &OPERATOR_TABLE
    }

    /// Descriptor for a tag string such as `"contains"` (case-sensitive)
    pub fn lookup(&self, tag: &str) -> Option<&OperatorDescriptor> {
        self.descriptors.iter().find(|d| d.tag.as_str() == tag)
    }

    pub fn descriptor(&self, tag: OperatorTag) -> &OperatorDescriptor {
        // Built from OperatorTag::ALL, so every tag has exactly one entry
        &self.descriptors[tag as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperatorDescriptor> {
        self.descriptors.iter()
    }
}
