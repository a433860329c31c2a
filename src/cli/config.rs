//! `wfimport config`: inspect and initialise the global configuration.
//!
//! ```bash
//! wfimport config show          # effective settings (defaults when no file)
//! wfimport config init          # write a default config file
//! wfimport config init --force  # overwrite an existing one
//! wfimport config path          # print the config file location
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::WfConfig;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show the effective configuration
    Show,

    /// Create a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the config file location
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let path = match config_path {
            Some(path) => path,
            None => WfConfig::default_path()?,
        };

        match self.command.unwrap_or(ConfigSubcommands::Show) {
            ConfigSubcommands::Show => show(path).await,
            ConfigSubcommands::Init {
                force,
            } => init(path, force).await,
            ConfigSubcommands::Path => {
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

async fn show(path: PathBuf) -> Result<()> {
    let exists = path.exists();
    let config = WfConfig::load_with_optional(Some(path.clone())).await?;

    println!("{} {}", "Config file:".bold(), path.display());
    if !exists {
        println!("{}", "(not found, showing defaults)".yellow());
    }
    println!();
    print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
    Ok(())
}

async fn init(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("{} Config already exists: {}", "❌".red(), path.display());
        println!("   Use {} to overwrite", "--force".yellow());
        return Ok(());
    }

    WfConfig::default().save_to(&path).await?;
    println!("{} Created config at {}", "✅".green(), path.display());
    Ok(())
}
