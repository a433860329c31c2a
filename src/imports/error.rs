//! Import resolution failures and their diagnostics.
//!
//! Every hard failure during resolution is an [`ImportError`]: the failing
//! import path, the document that declared it, a best-effort position inside
//! that document, and the underlying [`ImportFailure`]. Rendering goes through
//! [`CompilerDiagnostic`] so the user sees `file:line:col: error: message`
//! with the surrounding source.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::CompilerDiagnostic;
use crate::yaml::YamlErrorPosition;

/// Lines of context shown on each side of the failing line.
pub const CONTEXT_RADIUS: usize = 2;

/// Why an import could not be resolved.
#[derive(Error, Debug, Clone)]
pub enum ImportFailure {
    /// A local import target does not exist
    #[error("file not found: {path}")]
    FileNotFound {
        /// Resolved path that was looked up
        path: String,
        /// Closest existing file name, if any
        suggestion: Option<String>,
    },

    /// A remote fetch failed; the message comes from the fetcher
    #[error("{message}")]
    Remote {
        /// Fetcher error chain
        message: String,
    },

    /// A local import could not be read for a reason other than absence
    #[error("failed to read {path}: {message}")]
    Io {
        /// File that failed to read
        path: String,
        /// I/O error description
        message: String,
    },

    /// The traversal revisited an in-progress import
    #[error("import cycle detected: {}", chain.join(" -> "))]
    Cycle {
        /// Identities from the first occurrence back to itself
        chain: Vec<String>,
    },

    /// The imported document's frontmatter failed to parse
    #[error("failed to parse {}: {}", path.display(), position.message)]
    Yaml {
        /// The imported document
        path: PathBuf,
        /// Its full text, for rendering context
        text: String,
        /// Normalised position inside the imported document
        position: YamlErrorPosition,
    },

    /// An `imports:` entry has the wrong structure
    #[error("invalid imports entry: {reason}")]
    Malformed {
        /// What is wrong with the entry
        reason: String,
    },

    /// A `path#Section` import names a heading that does not exist
    #[error("section '{section}' not found in {path}")]
    SectionNotFound {
        /// File that was searched
        path: String,
        /// Requested heading title
        section: String,
    },

    /// A required input of the imported file was not provided
    #[error("missing required input '{name}' for {path}")]
    MissingInput {
        /// The imported file
        path: String,
        /// Input name
        name: String,
    },
}

/// Map a failure message onto the wording shown to users.
///
/// Known causes are recognised by substring, in priority order; anything else
/// is passed through unchanged (`None`).
pub fn classify_cause(message: &str) -> Option<&'static str> {
    const KNOWN: [(&str, &str); 4] = [
        ("file not found", "import file not found"),
        ("failed to download", "failed to download import file"),
        ("failed to resolve ref", "failed to resolve import reference"),
        ("invalid workflowspec", "invalid import specification"),
    ];
    KNOWN.iter().find(|(needle, _)| message.contains(needle)).map(|(_, label)| *label)
}

/// A failed import, positioned in the document that declared it.
#[derive(Debug, Clone)]
pub struct ImportError {
    /// The import path as written
    pub import_path: String,
    /// The document that declared the import
    pub file_path: PathBuf,
    /// 1-based line in `file_path`, 0 when unknown
    pub line: usize,
    /// 1-based column, 0 when unknown
    pub column: usize,
    /// Underlying failure
    pub cause: ImportFailure,
    /// Text of `file_path` used for the context window
    pub source_text: Option<String>,
}

impl ImportError {
    /// Create an error without position; see [`ImportError::locate_in`].
    pub fn new(
        import_path: impl Into<String>,
        file_path: impl Into<PathBuf>,
        cause: ImportFailure,
    ) -> Self {
        Self {
            import_path: import_path.into(),
            file_path: file_path.into(),
            line: 0,
            column: 0,
            cause,
            source_text: None,
        }
    }

    /// Set an explicit position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Attach the declaring document's text, discovering the position from it
    /// when none is known yet.
    #[must_use]
    pub fn locate_in(mut self, text: &str) -> Self {
        if self.line == 0 {
            let (line, column) = locate_import(text, &self.import_path);
            self.line = line;
            self.column = column;
        }
        self.source_text = Some(text.to_string());
        self
    }

    /// User-facing message: the classified cause plus the import path.
    pub fn message(&self) -> String {
        let cause = self.cause.to_string();
        match classify_cause(&cause) {
            Some(label) => format!("{label}: {}", self.import_path),
            None => cause,
        }
    }

    /// Build the diagnostic for this error.
    ///
    /// A located YAML failure points into the imported file itself; every
    /// other failure points at the declaring import.
    pub fn diagnostic(&self) -> CompilerDiagnostic {
        if let ImportFailure::Yaml {
            path,
            text,
            position,
        } = &self.cause
            && position.is_located()
        {
            return CompilerDiagnostic::error(
                path,
                position.line,
                position.column,
                format!("failed to parse import file: {}", position.message),
            )
            .with_source_context(text, CONTEXT_RADIUS);
        }

        let diagnostic =
            CompilerDiagnostic::error(&self.file_path, self.line, self.column, self.message());
        match &self.source_text {
            Some(text) => diagnostic.with_source_context(text, CONTEXT_RADIUS),
            None => diagnostic,
        }
    }

    /// Render as `file:line:col: error: message` plus a context window.
    pub fn render(&self) -> String {
        self.diagnostic().to_string()
    }

    /// A hint for fixing the failure, when one applies.
    pub fn suggestion(&self) -> String {
        match &self.cause {
            ImportFailure::FileNotFound {
                suggestion: Some(candidate),
                ..
            } => format!("Did you mean '{candidate}'?"),
            ImportFailure::FileNotFound {
                ..
            } => "Import paths are relative to the importing file; use '{{#import? path}}' for optional imports".to_string(),
            ImportFailure::Cycle {
                ..
            } => "Remove one of the imports in the cycle".to_string(),
            ImportFailure::Yaml {
                ..
            } => "Fix the YAML syntax of the imported file's frontmatter".to_string(),
            ImportFailure::Malformed {
                ..
            } => "Each imports entry must be a path string or a mapping with a 'path' key".to_string(),
            ImportFailure::SectionNotFound {
                ..
            } => "Section names match markdown headings case-insensitively".to_string(),
            ImportFailure::MissingInput {
                name,
                ..
            } => format!("Provide '{name}' under the import's 'inputs:' mapping"),
            ImportFailure::Remote {
                ..
            } => "Check the owner/repo/path@ref spec and the remote mirror configuration".to_string(),
            ImportFailure::Io {
                ..
            } => "Check file permissions and encoding (UTF-8)".to_string(),
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Render `err` against `raw_text`, the declaring document's text.
///
/// The position is discovered from `raw_text` when the error carries none.
pub fn format_import_error(err: &ImportError, raw_text: &str) -> String {
    err.clone().locate_in(raw_text).render()
}

/// Find where `import_path` is declared inside the `imports:` block.
///
/// Returns the 1-based `(line, column)` of the path text. Falls back to the
/// `imports:` key, then to `(1, 1)`.
pub fn locate_import(raw_text: &str, import_path: &str) -> (usize, usize) {
    let mut imports_key: Option<(usize, usize)> = None;

    for (index, line) in raw_text.lines().enumerate() {
        let number = index + 1;
        let trimmed = line.trim();

        if imports_key.is_none() {
            if trimmed.starts_with("imports:") {
                let indent = line.len() - line.trim_start().len();
                imports_key = Some((number, char_column(line, indent)));
                if let Some(offset) = line.find(import_path).filter(|_| !import_path.is_empty()) {
                    return (number, char_column(line, offset));
                }
            }
            continue;
        }

        let indented = line.starts_with([' ', '\t']);
        let ends_block = trimmed == "---"
            || (!trimmed.is_empty() && !indented && !trimmed.starts_with('-'));
        if ends_block {
            break;
        }
        if let Some(offset) = line.find(import_path).filter(|_| !import_path.is_empty()) {
            return (number, char_column(line, offset));
        }
    }

    imports_key.unwrap_or((1, 1))
}

/// 1-based character column of the byte `offset` within `line`.
fn char_column(line: &str, offset: usize) -> usize {
    line[..offset].chars().count() + 1
}
