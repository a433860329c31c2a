//! File system helpers.
//!
//! Reads carry structured [`FileOperationError`] context, writes go through a
//! temp-file-and-rename so readers never observe a half-written workflow.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::core::file_error::{FileOperation, FileOperationError, FileResultExt};

/// Reads a text file, attaching the purpose of the read to any failure.
///
/// Returns the typed [`FileOperationError`] so callers can tell a missing file
/// apart from other I/O failures.
pub fn read_text_file(path: &Path, purpose: &str) -> Result<String, FileOperationError> {
    fs::read_to_string(path).with_file_context(
        FileOperation::Read,
        path,
        purpose,
        "utils::fs::read_text_file",
    )
}

/// Ensures a directory exists, creating it and its parents if needed.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_file_context(FileOperation::CreateDir, path, "preparing output", "utils::fs")?;
    } else if !path.is_dir() {
        anyhow::bail!("Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Safely writes a string to a file using [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Write content to a sibling temporary file
/// 2. Sync the temporary file to disk
/// 3. Rename it over the target path
///
/// Parent directories are created when missing.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
    temp.write_all(content)
        .with_file_context(FileOperation::Write, temp.path(), "atomic write", "utils::fs")?;
    temp.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_file_context(FileOperation::Rename, path, "atomic write", "utils::fs")?;

    Ok(())
}
