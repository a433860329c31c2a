//! Normalisation of `imports:` entries.
//!
//! Accepted entry shapes:
//!
//! ```yaml
//! imports:
//!   - shared/tools.md                 # plain path
//!   - "{{#import? shared/extra.md}}"  # directive form, `?` marks optional
//!   - path: shared/review.md          # object form
//!     optional: true
//!     inputs:
//!       depth: 2
//!   - shared/guide.md#Setup           # section-scoped
//!   - octo/tools/mcp/github.md@v1     # remote
//! ```

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use super::error::ImportFailure;
use crate::markdown::{parse_import_directive, split_section};
use crate::yaml::{expect_mapping, expect_sequence, kind_name};

/// A parsed reference to an importable unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSpec {
    /// Path as written, including any `#Section` suffix
    pub path: String,
    /// A missing target is skipped instead of failing
    pub optional: bool,
    /// Values for the imported file's declared inputs
    #[serde(skip_serializing_if = "Mapping::is_empty")]
    pub inputs: Mapping,
}

impl ImportSpec {
    /// A required import without inputs.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            optional: false,
            inputs: Mapping::new(),
        }
    }

    /// Mark the import optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// The path without its `#Section` suffix.
    pub fn file_path(&self) -> &str {
        split_section(&self.path).0
    }

    /// The `#Section` title, if any.
    pub fn section(&self) -> Option<&str> {
        split_section(&self.path).1
    }
}

fn malformed(reason: impl Into<String>) -> ImportFailure {
    ImportFailure::Malformed {
        reason: reason.into(),
    }
}

/// Parse a string entry, which may be a plain path or a directive.
fn parse_string_entry(entry: &str) -> Result<ImportSpec, ImportFailure> {
    if let Some(directive) = parse_import_directive(entry) {
        return Ok(ImportSpec {
            path: directive.path,
            optional: directive.is_optional,
            inputs: Mapping::new(),
        });
    }

    let path = entry.trim();
    if path.is_empty() {
        return Err(malformed("import path must not be empty"));
    }
    Ok(ImportSpec::new(path))
}

fn parse_object_entry(entry: &Mapping) -> Result<ImportSpec, ImportFailure> {
    let path = match entry.get("path") {
        Some(Value::String(path)) if !path.trim().is_empty() => path.trim().to_string(),
        Some(Value::String(_)) => return Err(malformed("import path must not be empty")),
        Some(other) => {
            return Err(malformed(format!("'path' must be a string, found {}", kind_name(other))));
        }
        None => return Err(malformed("object entries require a 'path' key")),
    };

    let inputs = match entry.get("inputs") {
        None | Some(Value::Null) => Mapping::new(),
        Some(value) => expect_mapping("inputs", value).map_err(|e| malformed(e.to_string()))?.clone(),
    };

    let optional = match entry.get("optional") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(malformed(format!(
                "'optional' must be a boolean, found {}",
                kind_name(other)
            )));
        }
    };

    Ok(ImportSpec {
        path,
        optional,
        inputs,
    })
}

/// Normalise the value of an `imports:` key.
///
/// A missing key or `null` means no imports. Anything other than a sequence
/// of strings and `path` mappings is a structural failure.
pub fn parse_imports(value: Option<&Value>) -> Result<Vec<ImportSpec>, ImportFailure> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => expect_sequence("imports", value).map_err(|e| malformed(e.to_string()))?,
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(entry) => parse_string_entry(entry),
            Value::Mapping(entry) => parse_object_entry(entry),
            other => Err(malformed(format!(
                "entries must be strings or mappings, found {}",
                kind_name(other)
            ))),
        })
        .collect()
}
