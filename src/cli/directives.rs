//! `wfimport directives`: list the inline import directives of a workflow.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::resolve::load_workflow;

#[derive(Args)]
pub struct DirectivesCommand {
    /// Workflow document to scan
    file: PathBuf,
}

impl DirectivesCommand {
    pub async fn execute(self) -> Result<()> {
        let document = load_workflow(&self.file)?;
        let directives = document.import_directives();

        if directives.is_empty() {
            println!("No import directives in {}", self.file.display());
            return Ok(());
        }

        for found in directives {
            let directive = &found.directive;
            let mut flags = Vec::new();
            if directive.is_optional {
                flags.push("optional".cyan().to_string());
            }
            if directive.is_legacy {
                flags.push("deprecated syntax".yellow().to_string());
            }

            let suffix = if flags.is_empty() {
                String::new()
            } else {
                format!(" ({})", flags.join(", "))
            };
            println!("{}:{}: {}{}", self.file.display(), found.line, directive.path, suffix);
        }
        Ok(())
    }
}
