//! Core application

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::CompilerConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::query::{FanOut, OperatorTable, QueryCompiler, QueryMap};

pub struct CoreApp {
    pub cli: CliConfig,
    pub compiler: QueryCompiler,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Operators) => Self::print_operators(),
            Some(Commands::Compile) | None => {
                let app = Self::init(cli_config)?;
                app.compile_input()
            }
        }
    }

    fn init(cli: CliConfig) -> Result<Self> {
        let config = CompilerConfig::load(&cli)?;
        let compiler = QueryCompiler::new(config).context("Failed to create query compiler")?;
        Ok(Self { cli, compiler })
    }

    /// Logs go to stderr so stdout carries only the compiled query
    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    fn read_input(&self) -> Result<String> {
        match self.cli.input {
            Some(ref path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read query map from {}", path.display())),
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read query map from stdin")?;
                Ok(buf)
            }
        }
    }

    fn compile_input(&self) -> Result<()> {
        let raw = self.read_input()?;
        let query: QueryMap =
            serde_json::from_str(&raw).context("Query map must be a JSON object")?;
        tracing::debug!(keys = query.len(), "Query map parsed");

        let compiled = self.compiler.compile(&query);
        let output = if self.cli.pretty {
            serde_json::to_string_pretty(&compiled)
        } else {
            serde_json::to_string(&compiled)
        }
        .context("Failed to serialize compiled query")?;

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", output).context("Failed to write compiled query")?;
        Ok(())
    }

    fn print_operators() -> Result<()> {
        let mut stdout = io::stdout().lock();
        for descriptor in OperatorTable::global().iter() {
            let fan_out = match descriptor.fan_out {
                FanOut::PerElement => "per-element",
                FanOut::WholeValue => "whole-value",
            };
            writeln!(
                stdout,
                "{:<8} {:<8} {}",
                descriptor.tag.as_str(),
                descriptor.symbol,
                fan_out
            )?;
        }
        Ok(())
    }
}
