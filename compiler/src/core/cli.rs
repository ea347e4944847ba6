use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    APP_NAME_LOWER, ENV_CONFIG, ENV_DEFAULT_LIMIT, ENV_DEFAULT_PAGE, ENV_FIELDS_KEY, ENV_LIMIT_KEY,
    ENV_OPERATOR_KEY, ENV_PAGE_KEY, ENV_SORT_KEY,
};

#[derive(Parser)]
#[command(name = APP_NAME_LOWER)]
#[command(
    version,
    about = "Compile query-parameter maps into document-database queries",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read the query map (a JSON object) from this file instead of stdin
    #[arg(long, short = 'i', global = true)]
    pub input: Option<PathBuf>,

    /// Pretty-print the compiled query
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    // Reserved key options
    /// Name of the page number key
    #[arg(long, global = true, env = ENV_PAGE_KEY)]
    pub page_key: Option<String>,

    /// Name of the page size key
    #[arg(long, global = true, env = ENV_LIMIT_KEY)]
    pub limit_key: Option<String>,

    /// Name of the sort key
    #[arg(long, global = true, env = ENV_SORT_KEY)]
    pub sort_key: Option<String>,

    /// Name of the logical operator selector key (values: and, or)
    #[arg(long, global = true, env = ENV_OPERATOR_KEY)]
    pub operator_key: Option<String>,

    /// Name of the projection selector key
    #[arg(long, global = true, env = ENV_FIELDS_KEY)]
    pub fields_key: Option<String>,

    // Pagination options
    /// Page number used when the page key is absent
    #[arg(long, global = true, env = ENV_DEFAULT_PAGE)]
    pub default_page: Option<u64>,

    /// Page size used when the limit key is absent
    #[arg(long, global = true, env = ENV_DEFAULT_LIMIT)]
    pub default_limit: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compile a query map read from stdin or --input (default command)
    Compile,
    /// List the supported filter operators
    Operators,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub input: Option<PathBuf>,
    pub pretty: bool,
    pub config: Option<PathBuf>,
    pub page_key: Option<String>,
    pub limit_key: Option<String>,
    pub sort_key: Option<String>,
    pub operator_key: Option<String>,
    pub fields_key: Option<String>,
    pub default_page: Option<u64>,
    pub default_limit: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        input: cli.input,
        pretty: cli.pretty,
        config: cli.config,
        page_key: cli.page_key,
        limit_key: cli.limit_key,
        sort_key: cli.sort_key,
        operator_key: cli.operator_key,
        fields_key: cli.fields_key,
        default_page: cli.default_page,
        default_limit: cli.default_limit,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["docquery"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.pretty);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_parse_operators_command() {
        let cli = Cli::try_parse_from(["docquery", "operators"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Operators)));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docquery",
            "compile",
            "--pretty",
            "--operator-key",
            "logic",
            "--default-limit",
            "25",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Compile)));
        assert!(cli.pretty);
        assert_eq!(cli.operator_key, Some("logic".to_string()));
        assert_eq!(cli.default_limit, Some(25));
    }

    #[test]
    fn test_parse_rejects_non_numeric_default_page() {
        assert!(Cli::try_parse_from(["docquery", "--default-page", "two"]).is_err());
    }
}
