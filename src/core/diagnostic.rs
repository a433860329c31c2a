//! Compiler-style diagnostics.
//!
//! Renders `file:line:col: type: message` followed by a numbered-gutter
//! window of the surrounding source, the format every workflow compilation
//! error is reported in.
//!
//! ```text
//! .github/workflows/ci.md:4:5: error: import file not found: shared/missing.md
//!     2 | on: push
//!     3 | imports:
//!     4 |   - shared/missing.md
//!       |     ^
//!     5 | ---
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Compilation cannot continue
    Error,
    /// Reported but not fatal
    Warning,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
        }
    }
}

/// A positioned diagnostic with an optional source context window.
#[derive(Debug, Clone)]
pub struct CompilerDiagnostic {
    /// File the position refers to
    pub file: PathBuf,
    /// 1-based line, 0 when unknown
    pub line: usize,
    /// 1-based column, 0 when unknown
    pub column: usize,
    /// Severity
    pub kind: DiagnosticKind,
    /// The message shown after the severity
    pub message: String,
    /// Source lines surrounding `line`
    pub context: Vec<String>,
    /// Document line number of `context[0]`
    pub context_start: usize,
}

impl CompilerDiagnostic {
    /// Create an error diagnostic without context.
    pub fn error(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            kind: DiagnosticKind::Error,
            message: message.into(),
            context: Vec::new(),
            context_start: 0,
        }
    }

    /// Attach up to `radius` lines on each side of `self.line` from `source`.
    ///
    /// The window is clamped to the document bounds; nothing is attached when
    /// the line is unknown or outside the document.
    #[must_use]
    pub fn with_source_context(mut self, source: &str, radius: usize) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        if self.line == 0 || self.line > lines.len() {
            return self;
        }
        let start = self.line.saturating_sub(radius).max(1);
        let end = (self.line + radius).min(lines.len());
        self.context = lines[start - 1..end].iter().map(|l| (*l).to_string()).collect();
        self.context_start = start;
        self
    }

    fn location(&self) -> String {
        match (self.line, self.column) {
            (0, _) => format!("{}", self.file.display()),
            (line, 0) => format!("{}:{line}", self.file.display()),
            (line, column) => format!("{}:{line}:{column}", self.file.display()),
        }
    }

    fn gutter_width(&self) -> usize {
        let last = self.context_start + self.context.len().saturating_sub(1);
        last.to_string().len().max(4)
    }

    /// Print the diagnostic to stderr with terminal colors.
    pub fn display(&self) {
        let kind = match self.kind {
            DiagnosticKind::Error => self.kind.to_string().red().bold(),
            DiagnosticKind::Warning => self.kind.to_string().yellow().bold(),
        };
        eprintln!("{}: {}: {}", self.location().bold(), kind, self.message);

        let width = self.gutter_width();
        for (offset, text) in self.context.iter().enumerate() {
            let number = self.context_start + offset;
            eprintln!("{} {} {}", format!("{number:>width$}").blue(), "|".blue(), text);
            if number == self.line && self.column > 0 {
                eprintln!(
                    "{} {} {}{}",
                    " ".repeat(width),
                    "|".blue(),
                    " ".repeat(self.column - 1),
                    "^".red().bold()
                );
            }
        }
    }
}

impl fmt::Display for CompilerDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location(), self.kind, self.message)?;

        let width = self.gutter_width();
        for (offset, text) in self.context.iter().enumerate() {
            let number = self.context_start + offset;
            write!(f, "\n{number:>width$} | {text}")?;
            if number == self.line && self.column > 0 {
                write!(f, "\n{} | {}^", " ".repeat(width), " ".repeat(self.column - 1))?;
            }
        }
        Ok(())
    }
}
