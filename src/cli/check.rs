//! `wfimport check`: resolve every workflow under a directory.
//!
//! Each failure is printed as a compiler diagnostic; the command fails when
//! any workflow does. Remote content fetched for one workflow is shared with
//! the rest through a single manifest.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::resolve::document_base_dir;
use super::{CliConfig, build_resolver};
use crate::core::{WfError, user_friendly_error};
use crate::imports::ImportManifest;
use crate::markdown::{WorkflowDocument, list_markdown_files};

#[derive(Args)]
pub struct CheckCommand {
    /// Directory to scan (defaults to the configured workflows directory)
    dir: Option<PathBuf>,
}

impl CheckCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let settings = config.load_settings().await?;
        let dir = self.dir.unwrap_or_else(|| settings.workflows_dir.clone());
        let files = list_markdown_files(&dir)?;

        if files.is_empty() {
            println!("No workflows found in {}", dir.display());
            return Ok(());
        }

        let manifest = ImportManifest::new();
        let mut failed = 0usize;
        for file in &files {
            let outcome = WorkflowDocument::load(file).and_then(|document| {
                let resolver =
                    build_resolver(document_base_dir(file), &settings, manifest.clone());
                Ok(resolver.resolve_document(&document)?)
            });

            match outcome {
                Ok(result) => {
                    tracing::debug!(
                        "{}: {} import(s)",
                        file.display(),
                        result.imported_files.len()
                    );
                    println!("{} {}", "✓".green(), file.display());
                }
                Err(error) => {
                    failed += 1;
                    println!("{} {}", "✗".red(), file.display());
                    user_friendly_error(error).display();
                }
            }
        }

        println!();
        if failed > 0 {
            return Err(WfError::CheckFailed {
                failed,
                total: files.len(),
            }
            .into());
        }
        println!("{} {} workflow(s) resolved", "✓".green().bold(), files.len());
        Ok(())
    }
}
