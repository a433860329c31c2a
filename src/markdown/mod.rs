//! Workflow documents: YAML frontmatter plus a markdown body.
//!
//! # Document format
//!
//! ```markdown
//! ---
//! on: issues
//! engine: copilot
//! imports:
//!   - shared/tools.md
//!   - path: shared/review.md
//!     inputs:
//!       depth: 2
//! ---
//! # Triage
//!
//! {{#import? shared/house-style.md}}
//! ```
//!
//! Files ending in `.yml`/`.yaml` are platform workflow definitions and are
//! read as a single YAML mapping with no markdown body.
//!
//! # Modules
//!
//! - [`frontmatter`] - splitting, parsing and rewriting the frontmatter block
//! - [`directive`] - inline `@include` / `{{#import}}` directives
//! - [`section`] - `#Section` scoped slices of a body

pub mod directive;
pub mod frontmatter;
pub mod section;

use anyhow::Result;
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::CompilerDiagnostic;
use crate::utils::read_text_file;

pub use directive::{ImportDirective, LocatedDirective, parse_import_directive, scan_import_directives};
pub use frontmatter::{
    ExtractedFrontmatter, FrontmatterBoundaries, FrontmatterError, extract_frontmatter,
    get_frontmatter_boundaries, parse_frontmatter_yaml, replace_frontmatter, serialize_frontmatter,
    update_frontmatter,
};
pub use section::{extract_section, split_section};

/// A workflow document could not be split or parsed.
#[derive(Error, Debug, Clone)]
#[error("{}: {source}", path.display())]
pub struct DocumentError {
    /// The document
    pub path: PathBuf,
    /// Full document text, for rendering context
    pub text: String,
    /// What went wrong
    #[source]
    pub source: FrontmatterError,
}

impl DocumentError {
    /// Render as a positioned compiler diagnostic.
    pub fn render(&self) -> String {
        let (line, column) = self.source.position();
        let message = match &self.source {
            FrontmatterError::Yaml {
                position,
            } => format!("failed to parse frontmatter: {}", position.message),
            other => other.to_string(),
        };
        CompilerDiagnostic::error(&self.path, line, column, message)
            .with_source_context(&self.text, 2)
            .to_string()
    }
}

/// A loaded workflow document.
#[derive(Debug, Clone)]
pub struct WorkflowDocument {
    /// Where the document was read from
    pub path: PathBuf,
    /// The complete document text
    pub text: String,
    /// Parsed frontmatter, empty when absent
    pub frontmatter: Mapping,
    /// The YAML text the frontmatter was parsed from
    pub raw_frontmatter: Option<String>,
    /// Body after the frontmatter
    pub markdown: String,
    /// 1-based document line of the first frontmatter content line
    pub frontmatter_start_line: usize,
}

impl WorkflowDocument {
    /// Parse document text; the path decides between markdown and YAML.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, DocumentError> {
        let path = path.into();
        let text = text.into();

        if is_workflow_yaml(&path) {
            return match parse_frontmatter_yaml(&text, 1) {
                Ok(frontmatter) => Ok(Self {
                    raw_frontmatter: Some(text.clone()),
                    path,
                    text,
                    frontmatter,
                    markdown: String::new(),
                    frontmatter_start_line: 1,
                }),
                Err(source) => Err(DocumentError {
                    path,
                    text,
                    source,
                }),
            };
        }

        match extract_frontmatter(&text) {
            Ok(extracted) => Ok(Self {
                frontmatter_start_line: extracted
                    .boundaries
                    .map_or(0, |b| b.first_content_line),
                frontmatter: extracted.frontmatter,
                raw_frontmatter: extracted.raw,
                markdown: extracted.markdown,
                path,
                text,
            }),
            Err(source) => Err(DocumentError {
                path,
                text,
                source,
            }),
        }
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_text_file(path, "loading workflow")?;
        Ok(Self::parse(path, text)?)
    }

    /// Document line on which the markdown body starts.
    pub fn body_start_line(&self) -> usize {
        let header = self.text.len().saturating_sub(self.markdown.len());
        self.text[..header].matches('\n').count() + 1
    }

    /// Inline import directives of the body, numbered in document lines.
    pub fn import_directives(&self) -> Vec<LocatedDirective> {
        if self.is_workflow_yaml() {
            return Vec::new();
        }
        let offset = self.body_start_line() - 1;
        scan_import_directives(&self.markdown)
            .into_iter()
            .map(|found| LocatedDirective {
                line: found.line + offset,
                column: found.column,
                directive: found.directive,
            })
            .collect()
    }

    /// Whether this is a platform YAML workflow rather than markdown.
    pub fn is_workflow_yaml(&self) -> bool {
        is_workflow_yaml(&self.path)
    }
}

/// Whether a path names a platform YAML workflow (`.yml`/`.yaml`).
#[must_use]
pub fn is_workflow_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

/// Check if a path has a markdown extension (`.md` / `.markdown`, any case).
#[must_use]
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

/// Recursively find all markdown files under `dir`, sorted by path.
///
/// A missing directory yields an empty list. Unreadable entries are skipped.
pub fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if !dir.exists() {
        return Ok(files);
    }

    for entry in walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_markdown_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
