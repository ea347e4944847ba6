// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "docquery";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "docquery.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "DOCQUERY_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "DOCQUERY_LOG";

/// Log filter when neither DOCQUERY_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "warn";

// =============================================================================
// Environment Variables - Reserved Keys
// =============================================================================

/// Environment variable for the page key name
pub const ENV_PAGE_KEY: &str = "DOCQUERY_PAGE_KEY";

/// Environment variable for the limit key name
pub const ENV_LIMIT_KEY: &str = "DOCQUERY_LIMIT_KEY";

/// Environment variable for the sort key name
pub const ENV_SORT_KEY: &str = "DOCQUERY_SORT_KEY";

/// Environment variable for the logical operator selector key name
pub const ENV_OPERATOR_KEY: &str = "DOCQUERY_OPERATOR_KEY";

/// Environment variable for the projection selector key name
pub const ENV_FIELDS_KEY: &str = "DOCQUERY_FIELDS_KEY";

/// Environment variable for the default page number
pub const ENV_DEFAULT_PAGE: &str = "DOCQUERY_DEFAULT_PAGE";

/// Environment variable for the default page size
pub const ENV_DEFAULT_LIMIT: &str = "DOCQUERY_DEFAULT_LIMIT";

// =============================================================================
// Reserved Key Defaults
// =============================================================================

pub const DEFAULT_PAGE_KEY: &str = "page";
pub const DEFAULT_LIMIT_KEY: &str = "limit";
pub const DEFAULT_SORT_KEY: &str = "sort";
pub const DEFAULT_OPERATOR_KEY: &str = "_op";
pub const DEFAULT_FIELDS_KEY: &str = "_fields";

// =============================================================================
// Pagination Defaults
// =============================================================================

/// Default page number (1-based)
pub const DEFAULT_PAGE: u64 = 1;

/// Default items per page
pub const DEFAULT_LIMIT: u64 = 10;

// =============================================================================
// Query Literals
// =============================================================================

/// Literal that coerces to null, and disables pagination on the limit key
pub const NULL_LITERAL: &str = "null";

pub const TRUE_LITERAL: &str = "true";
pub const FALSE_LITERAL: &str = "false";

/// Path separator between field segments and the operator suffix
pub const PATH_SEPARATOR: char = '.';

/// Separator for list-valued parameters (`in`, sort, projection)
pub const LIST_SEPARATOR: char = ',';
