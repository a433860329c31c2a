//! wfimport - import resolution for markdown-authored workflows
//!
//! Workflow documents are markdown files with a YAML frontmatter block. A
//! document may pull in shared fragments through a frontmatter `imports:` list
//! or inline `{{#import path}}` directives; imported files can import further
//! files, locally or from remote repositories (`owner/repo/path@ref`).
//!
//! This crate resolves those imports into a cycle-free, deterministically
//! ordered list and merges each imported file's frontmatter sections and
//! markdown body into an [`imports::ImportsResult`].
//!
//! # Modules
//!
//! - [`markdown`] - document model, frontmatter splitting and rewriting,
//!   inline directives and `#Section` extraction
//! - [`imports`] - the resolver, ordering graph, merge rules, remote fetching
//!   and import error reporting
//! - [`yaml`] - YAML error positions and typed accessors
//! - [`config`] - global settings (`~/.wfimport/config.toml`)
//! - [`core`] - error types and compiler-style diagnostics
//! - [`utils`] - file system helpers
//! - [`cli`] - the `wfimport` command line
//!
//! # Example
//!
//! ```rust,no_run
//! use wfimport::imports::ImportResolver;
//! use wfimport::markdown::WorkflowDocument;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let document = WorkflowDocument::load(Path::new(".github/workflows/triage.md"))?;
//! let result = ImportResolver::new(".github/workflows").resolve_document(&document)?;
//! for identity in &result.imported_files {
//!     println!("{identity}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod imports;
pub mod markdown;
pub mod utils;
pub mod yaml;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
