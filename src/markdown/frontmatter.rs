//! Frontmatter extraction and in-place rewriting.
//!
//! A workflow document is a YAML block delimited by `---` lines followed by a
//! markdown body:
//!
//! ```markdown
//! ---
//! on: push
//! imports:
//!   - shared/tools.md
//! ---
//! # Triage issues
//! ```
//!
//! Extraction works on byte boundaries so the body can be written back
//! byte-for-byte after the frontmatter mapping is edited.

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use thiserror::Error;

use crate::utils::{read_text_file, safe_write};
use crate::yaml::{YamlErrorPosition, kind_name, normalize_yaml_error};

/// Byte boundaries of the frontmatter section in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterBoundaries {
    /// Byte position of the first YAML content byte (after the opening line)
    pub yaml_start: usize,
    /// Byte position of the closing `---` line
    pub yaml_end: usize,
    /// Byte position just after the closing delimiter line
    pub end: usize,
    /// 1-based document line of the first YAML content line
    pub first_content_line: usize,
}

/// Failure to split or parse a document's frontmatter.
#[derive(Error, Debug, Clone)]
pub enum FrontmatterError {
    /// The opening `---` has no matching closing line
    #[error("frontmatter is not closed: missing closing '---' line")]
    Unclosed,

    /// The YAML block does not parse
    #[error("failed to parse frontmatter: {}", position.message)]
    Yaml {
        /// Normalised position in whole-document coordinates
        position: YamlErrorPosition,
    },

    /// The YAML block parses to something other than a mapping
    #[error("frontmatter must be a mapping, found {found}")]
    NotAMapping {
        /// Shape that was found
        found: &'static str,
    },
}

impl FrontmatterError {
    /// Document position of the failure, `(0, 0)` when unknown.
    pub fn position(&self) -> (usize, usize) {
        match self {
            FrontmatterError::Yaml {
                position,
            } => (position.line, position.column),
            FrontmatterError::Unclosed => (1, 1),
            FrontmatterError::NotAMapping {
                ..
            } => (0, 0),
        }
    }
}

/// A document split into frontmatter mapping and markdown body.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFrontmatter {
    /// The parsed frontmatter, empty when the document has none
    pub frontmatter: Mapping,
    /// Raw YAML text between the delimiters
    pub raw: Option<String>,
    /// Everything after the closing delimiter line, or the whole document
    pub markdown: String,
    /// Location of the frontmatter, if present
    pub boundaries: Option<FrontmatterBoundaries>,
}

impl ExtractedFrontmatter {
    /// The raw YAML split into lines.
    pub fn frontmatter_lines(&self) -> Vec<&str> {
        self.raw.as_deref().map(|raw| raw.lines().collect()).unwrap_or_default()
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']).trim_end() == "---"
}

/// Locate the frontmatter section.
///
/// Frontmatter exists only when the very first line is `---`. Returns
/// `Ok(None)` when there is no frontmatter and [`FrontmatterError::Unclosed`]
/// when the closing delimiter is missing.
pub fn get_frontmatter_boundaries(
    content: &str,
) -> Result<Option<FrontmatterBoundaries>, FrontmatterError> {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_delimiter(first) {
        return Ok(None);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter(line) {
            return Ok(Some(FrontmatterBoundaries {
                yaml_start,
                yaml_end: offset,
                end: offset + line.len(),
                first_content_line: 2,
            }));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

/// Parse a YAML frontmatter block into a mapping.
///
/// `first_content_line` shifts parser positions into document coordinates.
pub fn parse_frontmatter_yaml(
    raw: &str,
    first_content_line: usize,
) -> Result<Mapping, FrontmatterError> {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(other) => Err(FrontmatterError::NotAMapping {
            found: kind_name(&other),
        }),
        Err(err) => Err(FrontmatterError::Yaml {
            position: normalize_yaml_error(&err, first_content_line),
        }),
    }
}

/// Split a document into its frontmatter mapping and markdown body.
pub fn extract_frontmatter(content: &str) -> Result<ExtractedFrontmatter, FrontmatterError> {
    let Some(boundaries) = get_frontmatter_boundaries(content)? else {
        return Ok(ExtractedFrontmatter {
            markdown: content.to_string(),
            ..ExtractedFrontmatter::default()
        });
    };

    let raw = &content[boundaries.yaml_start..boundaries.yaml_end];
    let frontmatter = parse_frontmatter_yaml(raw, boundaries.first_content_line)?;

    Ok(ExtractedFrontmatter {
        frontmatter,
        raw: Some(raw.to_string()),
        markdown: content[boundaries.end..].to_string(),
        boundaries: Some(boundaries),
    })
}

/// Serialise a frontmatter mapping; an empty mapping serialises to nothing.
pub fn serialize_frontmatter(frontmatter: &Mapping) -> Result<String> {
    if frontmatter.is_empty() {
        return Ok(String::new());
    }
    let yaml = serde_yaml::to_string(frontmatter).context("Failed to serialize frontmatter")?;
    Ok(yaml.trim_end().to_string())
}

/// Rebuild a document as `---\n<yaml>\n---\n<body>`.
///
/// With empty YAML the two delimiters are adjacent.
pub fn replace_frontmatter(yaml: &str, markdown: &str) -> String {
    if yaml.is_empty() {
        format!("---\n---\n{markdown}")
    } else {
        format!("---\n{yaml}\n---\n{markdown}")
    }
}

/// Read a workflow file, let `mutate` edit its frontmatter, and write it back.
///
/// Documents without frontmatter start from an empty mapping. When `mutate`
/// fails the file is left untouched. The markdown body is preserved exactly,
/// including an absent body.
pub fn update_frontmatter<F>(path: &Path, mutate: F) -> Result<()>
where
    F: FnOnce(&mut Mapping) -> Result<()>,
{
    let content = read_text_file(path, "updating frontmatter")?;
    let mut extracted = extract_frontmatter(&content)
        .with_context(|| format!("Failed to read frontmatter of {}", path.display()))?;

    mutate(&mut extracted.frontmatter)?;

    let yaml = serialize_frontmatter(&extracted.frontmatter)?;
    let updated = replace_frontmatter(&yaml, &extracted.markdown);
    tracing::debug!("Rewriting frontmatter of {}", path.display());
    safe_write(path, &updated)
}
