//! `wfimport resolve`: resolve one workflow and print the merged result.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

use super::{CliConfig, build_resolver};
use crate::core::WfError;
use crate::imports::{ImportManifest, ImportsResult};
use crate::markdown::WorkflowDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// The full merged result as JSON
    Json,
}

#[derive(Args)]
pub struct ResolveCommand {
    /// Workflow document to resolve
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the merged markdown after the summary
    #[arg(long)]
    markdown: bool,
}

impl ResolveCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let settings = config.load_settings().await?;
        let document = load_workflow(&self.file)?;
        let resolver =
            build_resolver(document_base_dir(&self.file), &settings, ImportManifest::new());

        let result = resolver.resolve_document(&document)?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Text => {
                print_summary(&self.file, &result);
                if self.markdown && !result.merged_markdown.is_empty() {
                    println!();
                    println!("{}", result.merged_markdown);
                }
            }
        }
        Ok(())
    }
}

/// Load a workflow, reporting a missing file as [`WfError::WorkflowNotFound`].
pub(super) fn load_workflow(path: &Path) -> Result<WorkflowDocument> {
    if !path.is_file() {
        return Err(WfError::WorkflowNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    WorkflowDocument::load(path)
}

/// Directory a workflow's relative imports resolve against.
pub(super) fn document_base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn print_summary(file: &Path, result: &ImportsResult) {
    if result.imported_files.is_empty() {
        println!("{} has no imports", file.display().to_string().bold());
        return;
    }

    println!(
        "{} {} import(s) for {}",
        "Resolved".green().bold(),
        result.imported_files.len(),
        file.display().to_string().bold()
    );
    for (index, identity) in result.imported_files.iter().enumerate() {
        println!("  {}. {}", index + 1, identity);
    }

    let sections = merged_sections(result);
    if !sections.is_empty() {
        println!();
        println!("{}", "Merged sections:".bold());
        for (name, count) in sections {
            println!("  {name}: {count}");
        }
    }

    if result.copilot_setup_steps.is_some() {
        println!();
        println!("{} setup steps captured", "✓".green());
    }
}

/// Non-empty merged sections with their entry counts.
fn merged_sections(result: &ImportsResult) -> Vec<(&'static str, usize)> {
    let maps: [(&'static str, &Mapping); 8] = [
        ("tools", &result.merged_tools),
        ("services", &result.merged_services),
        ("mcp-servers", &result.merged_mcp_servers),
        ("permissions", &result.merged_permissions),
        ("network", &result.merged_network),
        ("runtimes", &result.merged_runtimes),
        ("safe-outputs", &result.merged_safe_outputs),
        ("jobs", &result.merged_jobs),
    ];

    let mut sections: Vec<_> = maps
        .into_iter()
        .filter(|(_, map)| !map.is_empty())
        .map(|(name, map)| (name, map.len()))
        .collect();
    if result.merged_engine.is_some() {
        sections.push(("engine", 1));
    }
    if !result.merged_steps.is_empty() {
        sections.push(("steps", result.merged_steps.len()));
    }
    if !result.merged_post_steps.is_empty() {
        sections.push(("post-steps", result.merged_post_steps.len()));
    }
    sections
}
