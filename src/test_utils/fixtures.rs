//! Test fixtures for workflow trees
//!
//! [`WorkflowTree`] writes workflow documents into a temporary directory so
//! tests can resolve real files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::imports::{ImportResolver, ImportsResult};
use crate::markdown::WorkflowDocument;

/// A temporary directory of workflow files.
pub struct WorkflowTree {
    temp_dir: TempDir,
}

impl WorkflowTree {
    /// Create an empty tree. Honors `RUST_LOG` for test logging.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);
        Ok(Self {
            temp_dir: TempDir::new().context("Failed to create temp dir")?,
        })
    }

    /// Root directory of the tree.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a file in the tree.
    pub fn file_path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.file_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a markdown document with the given frontmatter and body.
    pub fn write_workflow(&self, relative: &str, frontmatter: &str, body: &str) -> Result<PathBuf> {
        let frontmatter = frontmatter.trim_end();
        let content = if frontmatter.is_empty() {
            body.to_string()
        } else {
            format!("---\n{frontmatter}\n---\n{body}")
        };
        self.write(relative, &content)
    }

    /// Write a markdown document whose only frontmatter is `imports`.
    pub fn write_importer(&self, relative: &str, imports: &[&str]) -> Result<PathBuf> {
        let frontmatter = if imports.is_empty() {
            String::new()
        } else {
            let entries: Vec<String> = imports.iter().map(|i| format!("  - {i}")).collect();
            format!("imports:\n{}", entries.join("\n"))
        };
        self.write_workflow(relative, &frontmatter, &format!("# {relative}\n"))
    }

    /// Read a file from the tree.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.file_path(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// A resolver rooted at the tree, logging to the active subscriber.
    pub fn resolver(&self) -> ImportResolver {
        ImportResolver::new(self.path())
            .with_dispatch(tracing::dispatcher::get_default(Clone::clone))
    }

    /// Load `relative` and resolve its imports with [`Self::resolver`].
    pub fn resolve(&self, relative: &str) -> Result<ImportsResult> {
        let document = WorkflowDocument::load(&self.file_path(relative))?;
        Ok(self.resolver().resolve_document(&document)?)
    }
}
