//! `wfimport frontmatter`: edit top-level frontmatter keys in place.
//!
//! The markdown body is preserved byte for byte; a failed edit leaves the
//! file untouched.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde_yaml::Value;
use std::path::PathBuf;

use crate::markdown::update_frontmatter;

#[derive(Args)]
pub struct FrontmatterCommand {
    #[command(subcommand)]
    command: FrontmatterSubcommands,
}

#[derive(Subcommand)]
enum FrontmatterSubcommands {
    /// Set a key to a YAML value
    Set {
        /// Workflow document to edit
        file: PathBuf,
        /// Top-level key
        key: String,
        /// Value, parsed as YAML (`true`, `3`, `[a, b]`, `{x: 1}`)
        value: String,
    },

    /// Remove a key
    Unset {
        /// Workflow document to edit
        file: PathBuf,
        /// Top-level key
        key: String,
    },
}

impl FrontmatterCommand {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            FrontmatterSubcommands::Set {
                file,
                key,
                value,
            } => {
                let parsed: Value = serde_yaml::from_str(&value)
                    .with_context(|| format!("Invalid YAML value for '{key}'"))?;
                update_frontmatter(&file, |frontmatter| {
                    frontmatter.insert(Value::String(key.clone()), parsed);
                    Ok(())
                })?;
                println!("{} Set '{}' in {}", "✓".green(), key, file.display());
            }
            FrontmatterSubcommands::Unset {
                file,
                key,
            } => {
                update_frontmatter(&file, |frontmatter| {
                    if frontmatter.remove(key.as_str()).is_none() {
                        bail!("Key '{key}' is not set in {}", file.display());
                    }
                    Ok(())
                })?;
                println!("{} Removed '{}' from {}", "✓".green(), key, file.display());
            }
        }
        Ok(())
    }
}
