//! Projection resolver

use super::types::{Projection, QueryMap};
use crate::core::config::CompilerConfig;
use crate::utils::string::split_list_trimmed;

/// `_fields=A, B` becomes `{ A: 1, B: 1 }`; `None` when the key is absent, null or empty
pub fn resolve_projection(query: &QueryMap, config: &CompilerConfig) -> Option<Projection> {
    let raw = query.scalar(&config.fields_key)?;
    if raw.is_empty() {
        return None;
    }

    let mut projection = Projection::default();
    for field in split_list_trimmed(&raw) {
        projection.include(field);
    }
    Some(projection)
}
