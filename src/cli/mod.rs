//! Command-line interface for wfimport.
//!
//! # Commands
//!
//! - `resolve` - resolve one workflow's imports and print the merged result
//! - `check` - resolve every workflow in a directory and report failures
//! - `directives` - list the inline import directives of a workflow body
//! - `frontmatter` - set or remove a top-level frontmatter key in place
//! - `config` - show, initialise or locate the global configuration
//!
//! # Global options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - no logging
//! - `--config` / `-c` - alternative global config file
//!
//! Logging is installed once by the binary from [`CliConfig::log_level`];
//! commands hand the active dispatcher to the resolver rather than relying on
//! a process-wide subscriber of their own.

mod check;
mod config;
mod directives;
mod frontmatter;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::WfConfig;
use crate::imports::{ImportManifest, ImportResolver};

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter, `None` to disable logging. `RUST_LOG` takes
    /// precedence when set.
    pub log_level: Option<String>,

    /// Explicit config file from `--config`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Empty configuration: default logging, default config location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log filter.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Use a specific config file.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Install a stderr `tracing` subscriber for the process.
    ///
    /// Does nothing when logging is disabled or a subscriber is already set.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the global settings this configuration points at.
    pub async fn load_settings(&self) -> Result<WfConfig> {
        WfConfig::load_with_optional(self.config_path.clone()).await
    }
}

/// Resolve and merge the imports of agentic workflow documents.
#[derive(Parser)]
#[command(
    name = "wfimport",
    about = "Resolve and merge imports of markdown workflow documents",
    version,
    long_about = "wfimport resolves the imports declared by markdown workflow documents \
                  (frontmatter `imports:` lists and inline {{#import}} directives), \
                  detects cycles, orders imports deterministically and merges their \
                  frontmatter sections and markdown bodies."
)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a workflow's imports and print the merged result
    Resolve(resolve::ResolveCommand),

    /// Resolve every workflow in a directory and report failures
    Check(check::CheckCommand),

    /// List the inline import directives of a workflow
    Directives(directives::DirectivesCommand),

    /// Edit a workflow's frontmatter in place
    Frontmatter(frontmatter::FrontmatterCommand),

    /// Manage the global configuration
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute with configuration built from the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    ///
    /// Verbose selects `debug`, quiet disables logging, and the default is
    /// `warn` so deprecation notices reach the user.
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&config).await,
            Commands::Check(cmd) => cmd.execute(&config).await,
            Commands::Directives(cmd) => cmd.execute().await,
            Commands::Frontmatter(cmd) => cmd.execute().await,
            Commands::Config(cmd) => cmd.execute(config.config_path).await,
        }
    }
}

/// A resolver for documents under `base_dir` using the global settings and
/// the currently active log dispatcher.
fn build_resolver(base_dir: PathBuf, settings: &WfConfig, manifest: ImportManifest) -> ImportResolver {
    let dispatch = tracing::dispatcher::get_default(Clone::clone);
    ImportResolver::new(base_dir)
        .with_manifest(manifest)
        .with_fetcher(settings.remote_fetcher())
        .with_checkout_action(settings.checkout_action.clone())
        .with_dispatch(dispatch)
}
