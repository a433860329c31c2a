//! Error handling for wfimport
//!
//! Two layers, following the same split used throughout the crate:
//! 1. **Strongly-typed errors** ([`WfError`]) for precise handling in code
//! 2. **User-friendly context** ([`ErrorContext`]) with suggestions for the CLI
//!
//! Import resolution failures have their own richer type,
//! [`crate::imports::ImportError`], which renders as a positioned compiler
//! diagnostic; [`user_friendly_error`] recognises it and keeps its rendering.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::core::file_error::FileOperationError;
use crate::imports::ImportError;
use crate::markdown::DocumentError;

/// The main error type for wfimport operations.
#[derive(Error, Debug, Clone)]
pub enum WfError {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A workflow document's frontmatter is malformed
    #[error("Invalid frontmatter in {file}: {reason}")]
    FrontmatterError {
        /// The workflow document
        file: String,
        /// What is wrong with it
        reason: String,
    },

    /// A workflow file was expected but not found
    #[error("Workflow file not found: {path}")]
    WorkflowNotFound {
        /// Path that was looked up
        path: String,
    },

    /// File system operation failed
    #[error("File system error: {operation} on {path}")]
    FileSystemError {
        /// The operation that failed
        operation: String,
        /// The file or directory involved
        path: String,
    },

    /// One or more workflows failed to resolve
    #[error("{failed} of {total} workflow(s) failed to resolve")]
    CheckFailed {
        /// Number of failing workflows
        failed: usize,
        /// Number of workflows checked
        total: usize,
    },

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error wrapper that adds user-friendly details and suggestions.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: WfError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
    /// Pre-rendered diagnostic that replaces the plain error line
    pub rendered: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`WfError`]
    #[must_use]
    pub const fn new(error: WfError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
            rendered: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        match &self.rendered {
            Some(rendered) => eprintln!("{rendered}"),
            None => eprintln!("{}: {}", "error".red().bold(), self.error),
        }

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rendered {
            Some(rendered) => write!(f, "{rendered}")?,
            None => write!(f, "{}", self.error)?,
        }

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognises [`ImportError`] and [`DocumentError`] (rendered as compiler
/// diagnostics),
/// [`WfError`], [`FileOperationError`] and YAML/TOML parse errors; anything
/// else is shown with its full context chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(import_error) = error.downcast_ref::<ImportError>() {
        let mut ctx = ErrorContext::new(WfError::Other {
            message: import_error.to_string(),
        });
        ctx.rendered = Some(import_error.render());
        return ctx.with_suggestion(import_error.suggestion());
    }

    if let Some(document_error) = error.downcast_ref::<DocumentError>() {
        let mut ctx = create_error_context(WfError::FrontmatterError {
            file: document_error.path.display().to_string(),
            reason: document_error.source.to_string(),
        });
        ctx.rendered = Some(document_error.render());
        return ctx;
    }

    if let Some(wf_error) = error.downcast_ref::<WfError>() {
        return create_error_context(wf_error.clone());
    }

    if let Some(file_error) = error.downcast_ref::<FileOperationError>() {
        return ErrorContext::new(WfError::FileSystemError {
            operation: file_error.operation.to_string(),
            path: file_error.file_path.display().to_string(),
        })
        .with_details(file_error.user_message());
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(WfError::ConfigError {
            message: toml_error.message().to_string(),
        })
        .with_suggestion("Check the TOML syntax of your wfimport configuration file");
    }

    if let Some(yaml_error) = error.downcast_ref::<serde_yaml::Error>() {
        return ErrorContext::new(WfError::Other {
            message: format!("Invalid YAML: {yaml_error}"),
        })
        .with_suggestion("Check indentation and quoting of the YAML value");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message = format!("{message}: {}", chain.join(": "));
    }
    ErrorContext::new(WfError::Other {
        message,
    })
}

/// Attach the standard suggestion for a [`WfError`] variant.
#[must_use]
pub fn create_error_context(error: WfError) -> ErrorContext {
    match &error {
        WfError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'wfimport config show' to inspect the active configuration"),
        WfError::FrontmatterError {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Frontmatter must start on the first line with '---' and be closed by another '---' line",
        ),
        WfError::WorkflowNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the path; workflow files are markdown documents ending in .md"),
        WfError::CheckFailed {
            ..
        } => ErrorContext::new(error)
            .with_details("Each failure is reported above with its source location"),
        _ => ErrorContext::new(error),
    }
}
