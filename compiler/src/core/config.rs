use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_FIELDS_KEY, DEFAULT_LIMIT, DEFAULT_LIMIT_KEY, DEFAULT_OPERATOR_KEY,
    DEFAULT_PAGE, DEFAULT_PAGE_KEY, DEFAULT_SORT_KEY,
};

// =============================================================================
// Validation Errors
// =============================================================================

/// Invalid compiler configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A reserved key name is empty
    #[error("Reserved key '{name}' must not be empty")]
    EmptyKey { name: &'static str },

    /// Two reserved keys share the same name
    #[error("Reserved key name '{key}' is used more than once")]
    DuplicateKey { key: String },

    /// Default page must be >= 1
    #[error("Default page must be >= 1, got {0}")]
    InvalidDefaultPage(u64),

    /// Default limit must be >= 1
    #[error("Default limit must be >= 1, got {0}")]
    InvalidDefaultLimit(u64),
}

// =============================================================================
// Compiler Configuration
// =============================================================================

/// Reserved key names and pagination defaults used by the compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub page_key: String,
    pub limit_key: String,
    pub sort_key: String,
    /// Selects the logical operator (`and` / `or`) that groups all clauses
    pub operator_key: String,
    /// Selects the projection mask
    pub fields_key: String,
    pub default_page: u64,
    pub default_limit: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            page_key: DEFAULT_PAGE_KEY.to_string(),
            limit_key: DEFAULT_LIMIT_KEY.to_string(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            operator_key: DEFAULT_OPERATOR_KEY.to_string(),
            fields_key: DEFAULT_FIELDS_KEY.to_string(),
            default_page: DEFAULT_PAGE,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl CompilerConfig {
    /// Reserved keys paired with their setting name, in a fixed order
    fn named_keys(&self) -> [(&'static str, &str); 5] {
        [
            ("page_key", &self.page_key),
            ("limit_key", &self.limit_key),
            ("sort_key", &self.sort_key),
            ("operator_key", &self.operator_key),
            ("fields_key", &self.fields_key),
        ]
    }

    /// Whether `key` is consumed by a satellite resolver instead of the filter pass
    pub fn is_reserved(&self, key: &str) -> bool {
        self.named_keys().iter().any(|(_, reserved)| *reserved == key)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let keys = self.named_keys();
        for (index, &(name, key)) in keys.iter().enumerate() {
            if key.is_empty() {
                return Err(ConfigError::EmptyKey { name });
            }
            if keys[..index].iter().any(|(_, earlier)| *earlier == key) {
                return Err(ConfigError::DuplicateKey {
                    key: key.to_string(),
                });
            }
        }
        if self.default_page < 1 {
            return Err(ConfigError::InvalidDefaultPage(self.default_page));
        }
        if self.default_limit < 1 {
            return Err(ConfigError::InvalidDefaultLimit(self.default_limit));
        }
        Ok(())
    }

    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Local directory config OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading compiler configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let path = match cli.config {
            Some(ref path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if local.exists() { Some(local) } else { None }
            }
        };

        let file_config = match path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };

        let config = Self::layer(file_config, cli);
        config.validate().context("Invalid compiler configuration")?;
        tracing::debug!(config = ?config, "Compiler configuration loaded");
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn layer(file_config: FileConfig, cli: &CliConfig) -> Self {
        let defaults = Self::default();
        let file_keys = file_config.keys.unwrap_or_default();
        let file_pagination = file_config.pagination.unwrap_or_default();

        let pick = |cli: &Option<String>, file: Option<String>, default: String| {
            cli.clone().or(file).unwrap_or(default)
        };

        Self {
            page_key: pick(&cli.page_key, file_keys.page, defaults.page_key),
            limit_key: pick(&cli.limit_key, file_keys.limit, defaults.limit_key),
            sort_key: pick(&cli.sort_key, file_keys.sort, defaults.sort_key),
            operator_key: pick(&cli.operator_key, file_keys.operator, defaults.operator_key),
            fields_key: pick(&cli.fields_key, file_keys.fields, defaults.fields_key),
            default_page: cli
                .default_page
                .or(file_pagination.default_page)
                .unwrap_or(defaults.default_page),
            default_limit: cli
                .default_limit
                .or(file_pagination.default_limit)
                .unwrap_or(defaults.default_limit),
        }
    }
}

// =============================================================================
// File Configuration
// =============================================================================

/// Reserved key names section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct KeysFileConfig {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub operator: Option<String>,
    pub fields: Option<String>,
}

/// Pagination defaults section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaginationFileConfig {
    pub default_page: Option<u64>,
    pub default_limit: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub keys: Option<KeysFileConfig>,
    pub pagination: Option<PaginationFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}
