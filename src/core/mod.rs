//! Core types shared across wfimport
//!
//! - [`error`] - [`WfError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`diagnostic`] - compiler-style `file:line:col: error: message` rendering
//! - [`file_error`] - file operation errors that carry their call-site context

pub mod diagnostic;
pub mod error;
pub mod file_error;

pub use diagnostic::{CompilerDiagnostic, DiagnosticKind};
pub use error::{ErrorContext, WfError, create_error_context, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
