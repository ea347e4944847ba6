//! Compile flat query-parameter maps into document-database query descriptions.

pub mod app;
pub mod core;
pub mod query;
pub mod utils;

pub use crate::core::{CompilerConfig, ConfigError};
pub use crate::query::{CompiledQuery, QueryCompiler, QueryMap, QueryValue, compile};
