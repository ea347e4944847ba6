//! Query compiler entry point

use super::filters::assemble_filters;
use super::operators::OperatorTable;
use super::pagination::resolve_pagination;
use super::projection::resolve_projection;
use super::sort::resolve_sort;
use super::types::{CompiledQuery, QueryMap};
use crate::core::config::{CompilerConfig, ConfigError};

/// Compiles query maps with a fixed, validated configuration.
///
/// Compilation is a pure function of the input map: no I/O, no shared
/// mutable state, and it never fails.
#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    config: CompilerConfig,
}

impl QueryCompiler {
    pub fn new(config: CompilerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, query: &QueryMap) -> CompiledQuery {
        let compiled = CompiledQuery {
            pagination: resolve_pagination(query, &self.config),
            filters: assemble_filters(query, &self.config, OperatorTable::global()),
            sort: resolve_sort(query, &self.config),
            fields: resolve_projection(query, &self.config),
        };

        tracing::debug!(
            keys = query.len(),
            clauses = compiled.filters.clauses().len(),
            logical = ?compiled.filters.logical(),
            paginated = compiled.pagination.is_some(),
            sorted = compiled.sort.is_some(),
            projected = compiled.fields.is_some(),
            "Compiled query"
        );
        compiled
    }
}

/// Compile with the default reserved keys (`page`, `limit`, `sort`, `_op`, `_fields`)
pub fn compile(query: &QueryMap) -> CompiledQuery {
    QueryCompiler::default().compile(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = CompilerConfig {
            limit_key: "page".to_string(),
            ..Default::default()
        };
        assert!(QueryCompiler::new(config).is_err());
    }

    #[test]
    fn test_compile_merges_all_parts() {
        let query = QueryMap::try_from(json!({
            "sort": "Name DESC",
            "status": "open",
            "_fields": "Name",
            "page": "3",
            "limit": "5"
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(compile(&query)).unwrap(),
            json!({
                "pagination": { "limit": 5, "offset": 10 },
                "filters": { "$and": [{ "status": { "$eq": "open" } }] },
                "sort": { "Name": -1 },
                "fields": { "Name": 1 }
            })
        );
    }

    #[test]
    fn test_compile_with_custom_keys() {
        let compiler = QueryCompiler::new(CompilerConfig {
            page_key: "p".to_string(),
            limit_key: "size".to_string(),
            ..Default::default()
        })
        .unwrap();
        let query = QueryMap::try_from(json!({ "p": "2", "size": "4", "page": "9" })).unwrap();

        assert_eq!(
            serde_json::to_value(compiler.compile(&query)).unwrap(),
            json!({
                "pagination": { "limit": 4, "offset": 4 },
                "filters": { "$and": [{ "page": { "$eq": "9" } }] }
            })
        );
    }
}
