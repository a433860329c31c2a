//! Structured file system error handling
//!
//! File operations capture their context (what was being done, to which file,
//! and by whom) at the call site instead of parsing I/O error messages later.

use std::path::PathBuf;
use thiserror::Error;

/// Types of file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading a file completely
    Read,
    /// Writing a file
    Write,
    /// Renaming a temporary file into place
    Rename,
    /// Creating a directory
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Rename => write!(f, "renaming"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

/// File operation error with the context in which it happened
#[derive(Error, Debug)]
#[error("Failed {operation} file '{}' for {purpose} ({caller})", file_path.display())]
pub struct FileOperationError {
    /// The type of operation that failed
    pub operation: FileOperation,
    /// The file path that was being accessed
    pub file_path: PathBuf,
    /// Why the file was being accessed
    pub purpose: String,
    /// What code initiated the operation
    pub caller: String,
    /// The underlying IO error
    #[source]
    pub source: std::io::Error,
}

impl FileOperationError {
    /// Whether the underlying I/O error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == std::io::ErrorKind::NotFound
    }

    /// Get a user-friendly error message with hints for the common cases
    pub fn user_message(&self) -> String {
        let mut message = self.to_string();

        match self.source.kind() {
            std::io::ErrorKind::NotFound => {
                message.push_str("\n\nThe file does not exist at the specified path.");
                if matches!(
                    self.file_path.extension().and_then(|s| s.to_str()),
                    Some("md" | "yml" | "yaml")
                ) {
                    message.push_str("\nCheck that the import path is spelled correctly (paths are case-sensitive)");
                    message.push_str("\nand that it is relative to the workflows directory.");
                }
            }
            std::io::ErrorKind::PermissionDenied => {
                message.push_str(&format!(
                    "\n\nPermission denied. Check file/directory permissions for: {}",
                    self.file_path.display()
                ));
            }
            std::io::ErrorKind::InvalidData => {
                message.push_str("\n\nThe file contains invalid data or encoding.");
                message.push_str("\nEnsure the file contains valid UTF-8 text.");
            }
            _ => {
                message.push_str(&format!("\n\nError details: {}", self.source));
            }
        }

        message
    }
}

/// Attach a [`FileOperationError`] context to a raw I/O result.
pub trait FileResultExt<T> {
    /// Wrap the I/O error with operation, path, purpose and caller.
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        caller: impl Into<String>,
    ) -> Result<T, FileOperationError>;
}

impl<T> FileResultExt<T> for Result<T, std::io::Error> {
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        caller: impl Into<String>,
    ) -> Result<T, FileOperationError> {
        self.map_err(|source| FileOperationError {
            operation,
            file_path: file_path.into(),
            purpose: purpose.into(),
            caller: caller.into(),
            source,
        })
    }
}
